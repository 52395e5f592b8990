//! Synthetic test data: single files of a given size, trees of many small
//! files, and small in-place edits that guarantee the content changed.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use rand::RngCore;
use tracing::info;
use walkdir::WalkDir;

use vcbench_core::{digitlength, hcount, hsize, Stopwatch};

/// How file contents are produced. Sparse files exercise metadata paths
/// cheaply; random content defeats delta and compression layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataGen {
    Sparse,
    Random,
}

impl DataGen {
    pub fn as_str(self) -> &'static str {
        match self {
            DataGen::Sparse => "sparse",
            DataGen::Random => "random",
        }
    }
}

impl FromStr for DataGen {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sparse" => Ok(DataGen::Sparse),
            "random" => Ok(DataGen::Random),
            other => Err(anyhow!("invalid data_gen strategy: {}", other)),
        }
    }
}

/// Creates a test file of a given size, making subdirectories as needed.
pub fn create_file(directory: &Path, name: &str, filebytes: u64, data_gen: DataGen, quiet: bool) -> Result<()> {
    let path = directory.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    if !quiet {
        info!("Generating {} ({}, {})", name, hsize(filebytes), data_gen.as_str());
    }
    let sw = Stopwatch::start();

    let mut f = std::fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
    match data_gen {
        DataGen::Sparse => f.set_len(filebytes)?,
        DataGen::Random => {
            let chunksize: u64 = 1 << 20;
            let mut rng = rand::thread_rng();
            let mut chunk = vec![0u8; chunksize as usize];
            let (whole, rest) = (filebytes / chunksize, filebytes % chunksize);
            for _ in 0..whole {
                rng.fill_bytes(&mut chunk);
                f.write_all(&chunk)?;
            }
            rng.fill_bytes(&mut chunk[..rest as usize]);
            f.write_all(&chunk[..rest as usize])?;
        }
    }

    if !quiet {
        info!(
            "Generated  {} ({}, {}) in {:5.3} seconds",
            name,
            hsize(filebytes),
            data_gen.as_str(),
            sw.elapsed_secs()
        );
    }
    Ok(())
}

/// Overwrites a few bytes in the middle of a file, guaranteeing the new
/// bytes differ from what was there.
pub fn make_small_edit(directory: &Path, name: &str, quiet: bool) -> Result<()> {
    let path = directory.join(name);
    let filebytes = std::fs::metadata(&path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    let pos = filebytes / 4;
    let chunksize = std::cmp::max(filebytes / 1024, 1) as usize; // KiB in a MiB, MiB in a GiB, and so on

    if !quiet {
        info!(
            "Overwriting {} of {} ({}) at position {:#010x}",
            hsize(chunksize as u64),
            name,
            hsize(filebytes),
            pos
        );
    }
    let sw = Stopwatch::start();

    let mut f = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    f.seek(SeekFrom::Start(pos))?;

    // With a chunk of just a few bytes there is a real chance of randomly
    // regenerating the exact bytes already present, so read the existing
    // chunk and re-draw until the replacement differs.
    let mut rng = rand::thread_rng();
    let mut newchunk = vec![0u8; chunksize];
    if chunksize <= 256 {
        let mut existing = vec![0u8; chunksize];
        let n = f.read(&mut existing)?;
        existing.truncate(n);
        newchunk.truncate(n.max(1));
        loop {
            rng.fill_bytes(&mut newchunk);
            if newchunk != existing {
                break;
            }
        }
    } else {
        rng.fill_bytes(&mut newchunk);
    }
    f.seek(SeekFrom::Start(pos))?;
    f.write_all(&newchunk)?;

    if !quiet {
        info!(
            "Overwrote {} of {} ({}) in {:5.3} seconds",
            hsize(newchunk.len() as u64),
            name,
            hsize(filebytes),
            sw.elapsed_secs()
        );
    }
    Ok(())
}

/// Splits an object name into subdirectory segments plus a file name,
/// `dir_split` characters per segment, `dir_depth` segments deep.
pub fn object_dir_split(obj_name: &str, dir_split: usize, dir_depth: usize) -> Result<(String, String)> {
    if dir_split * dir_depth > obj_name.len() {
        bail!(
            "cannot dir-split, too many splits: {}*{}={} > len('{}')",
            dir_split,
            dir_depth,
            dir_split * dir_depth,
            obj_name
        );
    }
    let mut dirname = String::new();
    for i in 0..dir_depth {
        let split = i * dir_split;
        dirname.push_str(&obj_name[split..split + dir_split]);
        dirname.push('/');
    }
    let fname = obj_name[dir_split * dir_depth..].to_string();
    Ok((dirname, fname))
}

/// Creates a set of many files under `prefix` in the given directory.
/// Names are zero-padded sequence numbers, split into two-character
/// subdirectories once the padding width reaches three digits.
pub fn create_many_files(
    directory: &Path,
    numfiles: u64,
    eachfilebytes: u64,
    prefix: &str,
    data_gen: DataGen,
) -> Result<()> {
    info!("Generating {} files of {} each...", hcount(numfiles), hsize(eachfilebytes));
    let sw = Stopwatch::start();

    let width = digitlength(numfiles.saturating_sub(1)) as usize;
    for i in 0..numfiles {
        let seqrep = format!("{:0width$}", i, width = width);
        let name = if width < 3 {
            format!("{}/{}", prefix, seqrep)
        } else {
            let (dirname, fname) = object_dir_split(&seqrep, 2, 1)?;
            format!("{}/{}{}", prefix, dirname, fname)
        };
        create_file(directory, &name, eachfilebytes, data_gen, true)?;
    }

    info!(
        "Generated {} files of {} each in {:5.3} seconds",
        hcount(numfiles),
        hsize(eachfilebytes),
        sw.elapsed_secs()
    );
    Ok(())
}

/// Small-edits every nth file under `prefix`. Returns the number updated.
pub fn update_many_files(directory: &Path, prefix: &str, every_nth_file: u64) -> Result<u64> {
    info!("Updating every {}th file...", every_nth_file);
    let sw = Stopwatch::start();

    let mut updated = 0u64;
    let mut checked = 0u64;
    for entry in WalkDir::new(directory.join(prefix)) {
        let entry = entry.with_context(|| "walk file tree")?;
        if !entry.file_type().is_file() || entry.file_name() == ".prototype_cache" {
            continue;
        }
        if checked % every_nth_file == 0 {
            let rel = entry
                .path()
                .strip_prefix(directory)
                .with_context(|| "relativize path")?;
            let rel = rel.to_str().ok_or_else(|| anyhow!("non-utf8 path: {:?}", rel))?;
            make_small_edit(directory, rel, true)?;
            updated += 1;
        }
        checked += 1;
    }

    info!(
        "Updated {} files of {} in {:5.3} seconds",
        hcount(updated),
        hcount(checked),
        sw.elapsed_secs()
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read_file(dir: &Path, name: &str) -> Vec<u8> {
        std::fs::read(dir.join(name)).unwrap()
    }

    fn sorted_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_str()
                    .unwrap()
                    .to_string()
            })
            .collect();
        names.sort();
        names
    }

    #[test]
    fn create_file_sparse() {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "test_file", 10, DataGen::Sparse, true).unwrap();
        assert_eq!(read_file(dir.path(), "test_file"), vec![0u8; 10]);
    }

    #[test]
    fn create_file_random() {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "test_file", 10, DataGen::Random, true).unwrap();
        let content = read_file(dir.path(), "test_file");
        assert_eq!(content.len(), 10);
        assert_ne!(content, vec![0u8; 10]);
    }

    #[test]
    fn create_file_makes_subdirectories() {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "subdir/test_file", 10, DataGen::Sparse, true).unwrap();
        assert_eq!(read_file(dir.path(), "subdir/test_file"), vec![0u8; 10]);
    }

    #[test]
    fn small_edit_changes_content() {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "test_file", 10, DataGen::Sparse, true).unwrap();
        make_small_edit(dir.path(), "test_file", true).unwrap();
        let content = read_file(dir.path(), "test_file");
        assert_eq!(content.len(), 10);
        assert_ne!(content, vec![0u8; 10]);
    }

    #[test]
    fn dir_split_simple() {
        assert_eq!(
            object_dir_split("helloworldparty", 2, 1).unwrap(),
            ("he/".to_string(), "lloworldparty".to_string())
        );
        assert_eq!(
            object_dir_split("helloworldparty", 3, 2).unwrap(),
            ("hel/low/".to_string(), "orldparty".to_string())
        );
    }

    #[test]
    fn dir_split_too_long() {
        assert!(object_dir_split("helloworldparty", 3, 10).is_err());
    }

    #[test]
    fn many_files_10() {
        let dir = tempdir().unwrap();
        create_many_files(dir.path(), 10, 5, "asdf", DataGen::Sparse).unwrap();
        let names = sorted_files(dir.path());
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "asdf/0");
        assert_eq!(names[9], "asdf/9");
        for name in &names {
            assert_eq!(read_file(dir.path(), name), vec![0u8; 5]);
        }
    }

    #[test]
    fn many_files_101_splits_directories() {
        let dir = tempdir().unwrap();
        create_many_files(dir.path(), 101, 10, "test", DataGen::Sparse).unwrap();
        let names = sorted_files(dir.path());
        assert_eq!(names.len(), 101);
        assert_eq!(names[0], "test/00/0");
        assert_eq!(names[100], "test/10/0");
    }

    #[test]
    fn many_files_1000() {
        let dir = tempdir().unwrap();
        create_many_files(dir.path(), 1000, 10, "test", DataGen::Sparse).unwrap();
        let names = sorted_files(dir.path());
        assert_eq!(names.len(), 1000);
        assert_eq!(names[0], "test/00/0");
        assert_eq!(names[999], "test/99/9");
    }

    #[test]
    fn update_every_tenth_file() {
        let dir = tempdir().unwrap();
        create_many_files(dir.path(), 640, 10, "asdf", DataGen::Sparse).unwrap();
        let updated = update_many_files(dir.path(), "asdf", 10).unwrap();
        assert_eq!(updated, 64);

        let changed = sorted_files(dir.path())
            .iter()
            .filter(|n| read_file(dir.path(), n) != vec![0u8; 10])
            .count();
        assert_eq!(changed, 64);
    }
}
