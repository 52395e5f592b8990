//! Environment fact-gathering for report headers. Everything here is read
//! once per sweep and printed as commented key/value lines so a result
//! table records where and when it was produced.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use vcbench_core::check_output;

#[derive(Clone, Debug)]
pub struct TrialEnv {
    pub date: String,
    pub commandline: String,
    pub hostname: String,
    pub platform: String,
    pub memtotal: String,
    pub memfree: String,
    pub cpuinfo: String,
    pub fsinfo: String,
    pub diskinfo: String,
}

impl TrialEnv {
    /// Ordered pairs for `align_kvs`.
    pub fn kvs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("date", self.date.clone()),
            ("commandline", self.commandline.clone()),
            ("hostname", self.hostname.clone()),
            ("platform", self.platform.clone()),
            ("memtotal", self.memtotal.clone()),
            ("memfree", self.memfree.clone()),
            ("cpuinfo", self.cpuinfo.clone()),
            ("fsinfo", self.fsinfo.clone()),
            ("diskinfo", self.diskinfo.clone()),
        ]
    }
}

/// Collects environment facts, including `df` output for the directories
/// the trial will write into.
pub fn gather(dirs: &[&Path]) -> Result<TrialEnv> {
    let cwd = std::env::current_dir().context("current dir")?;

    let hostname = std::fs::read_to_string("/proc/sys/kernel/hostname")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let platform = check_output(&cwd, "uname", &["-a"], &[]).unwrap_or_else(|_| "unknown".to_string());

    let (memtotal, memfree) = meminfo()?;
    let cpuinfo = cpuinfo()?;

    let fsinfo = if dirs.is_empty() {
        String::new()
    } else {
        let mut args = vec!["-h"];
        let rendered: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
        args.extend(rendered.iter().map(|s| s.as_str()));
        check_output(&cwd, "df", &args, &[]).context("df")?
    };

    Ok(TrialEnv {
        date: Utc::now().to_rfc3339(),
        commandline: std::env::args().collect::<Vec<_>>().join(" "),
        hostname,
        platform,
        memtotal,
        memfree,
        cpuinfo,
        fsinfo,
        diskinfo: diskinfo(),
    })
}

fn meminfo() -> Result<(String, String)> {
    let text = std::fs::read_to_string("/proc/meminfo").context("read /proc/meminfo")?;
    let mut total = String::new();
    let mut free = String::new();
    for line in text.lines() {
        if let Some((k, v)) = line.split_once(':') {
            match k {
                "MemTotal" => total = v.trim().to_string(),
                "MemFree" => free = v.trim().to_string(),
                _ => {}
            }
        }
    }
    Ok((total, free))
}

fn cpuinfo() -> Result<String> {
    let text = std::fs::read_to_string("/proc/cpuinfo").context("read /proc/cpuinfo")?;
    let keep = ["processor", "model name", "cpu MHz", "cache size"];
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| line.is_empty() || keep.iter().any(|k| line.starts_with(k)))
        .collect();
    Ok(lines.join("\n").trim().to_string())
}

/// Vendor/model/scheduler per physical disk. Best effort: containers and
/// VMs often expose none of these.
fn diskinfo() -> String {
    let mut out = String::new();
    let entries = match std::fs::read_dir("/sys/block") {
        Ok(entries) => entries,
        Err(_) => return out,
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("sd"))
        .collect();
    names.sort();
    for name in names {
        let read = |sub: &str| {
            std::fs::read_to_string(format!("/sys/block/{}/{}", name, sub))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        out.push_str(&format!(
            "{}\tvendor: {}, model: {}\tscheduler: {}\n",
            name,
            read("device/vendor"),
            read("device/model"),
            read("queue/scheduler")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn gathers_memory_facts() {
        let env = gather(&[]).unwrap();
        assert!(!env.memtotal.is_empty());
        assert!(!env.date.is_empty());
        assert!(!env.commandline.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn kvs_keeps_report_order() {
        let env = gather(&[]).unwrap();
        let kvs = env.kvs();
        assert_eq!(kvs[0].0, "date");
        assert_eq!(kvs.last().unwrap().0, "diskinfo");
    }
}
