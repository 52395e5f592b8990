use std::fmt;

/// Raw classification of a single external command invocation. Set once per
/// attempt; `NeverExecuted` survives into the report when a step is skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CmdOutcome {
    #[default]
    NeverExecuted,
    Ok,
    Failed,
}

impl CmdOutcome {
    pub const ALL: [CmdOutcome; 3] = [CmdOutcome::NeverExecuted, CmdOutcome::Ok, CmdOutcome::Failed];

    /// Short code used in report rows.
    pub fn code(self) -> &'static str {
        match self {
            CmdOutcome::NeverExecuted => "no_exec",
            CmdOutcome::Ok => "ok",
            CmdOutcome::Failed => "failed",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            CmdOutcome::NeverExecuted => "Command was never executed",
            CmdOutcome::Ok => "Command completed successfully",
            CmdOutcome::Failed => "Command failed",
        }
    }

    /// Widest code, for sizing report columns.
    pub fn max_width() -> usize {
        Self::ALL.iter().map(|o| o.code().len()).max().unwrap_or(0)
    }
}

impl fmt::Display for CmdOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whether an operation's *effect* actually took hold, independent of the
/// exit status the tool reported. Computed from the adapter's observation
/// points (head id, file presence, integrity check), never from the exit
/// code alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerificationOutcome {
    #[default]
    NotVerified,
    AssumedOk,
    Verified,
    Bad,
    VerificationError,
}

impl VerificationOutcome {
    pub const ALL: [VerificationOutcome; 5] = [
        VerificationOutcome::NotVerified,
        VerificationOutcome::AssumedOk,
        VerificationOutcome::Verified,
        VerificationOutcome::Bad,
        VerificationOutcome::VerificationError,
    ];

    pub fn code(self) -> &'static str {
        match self {
            VerificationOutcome::NotVerified => "no_ver",
            VerificationOutcome::AssumedOk => "assumed",
            VerificationOutcome::Verified => "verified",
            VerificationOutcome::Bad => "bad",
            VerificationOutcome::VerificationError => "ver_err",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            VerificationOutcome::NotVerified => "Verification was never performed",
            VerificationOutcome::AssumedOk => "Assumed ok because dependent commands successful",
            VerificationOutcome::Verified => "Verified OK",
            VerificationOutcome::Bad => "Verification discovered an error",
            VerificationOutcome::VerificationError => "Could not verify due to error during verification",
        }
    }

    pub fn max_width() -> usize {
        Self::ALL.iter().map(|o| o.code().len()).max().unwrap_or(0)
    }

    /// Evidence against the step: proven wrong, or unverifiable.
    pub fn is_suspect(self) -> bool {
        matches!(self, VerificationOutcome::Bad | VerificationOutcome::VerificationError)
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The three recorded slots of one risky trial step: the raw command
/// outcome, the verification of the operation's expected effect, and the
/// verification of overall repository integrity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepResult {
    pub cmd: CmdOutcome,
    pub effect: VerificationOutcome,
    pub repo: VerificationOutcome,
}

impl StepResult {
    /// Whether the trial may proceed past this step.
    ///
    /// A failed command is tolerable only when its effect was independently
    /// confirmed (the failed-but-verified rescue); any slot that reads
    /// `bad` or `ver_err` stops the trial.
    pub fn acceptable(&self) -> bool {
        let cmd_ok = match self.cmd {
            CmdOutcome::Ok => true,
            CmdOutcome::Failed => self.effect == VerificationOutcome::Verified,
            CmdOutcome::NeverExecuted => false,
        };
        cmd_ok && !self.effect.is_suspect() && !self.repo.is_suspect()
    }
}

/// Legend lines for report headers: every outcome code with its meaning.
pub fn outcome_legend() -> Vec<(&'static str, String)> {
    let mut kvs = Vec::new();
    for o in CmdOutcome::ALL {
        kvs.push((o.code(), o.describe().to_string()));
    }
    for o in VerificationOutcome::ALL {
        kvs.push((o.code(), o.describe().to_string()));
    }
    kvs
}
