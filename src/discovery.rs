// src/discovery.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
/// Every file under `dir` (recursively) whose extension equals `extension`,
/// sorted by path.
pub fn find_recordings(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect(dir, extension, &mut found)?;
    found.sort();
    Ok(found)
}
fn collect(dir: &Path, extension: &str, found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, extension, found)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            found.push(path);
        }
    }
    Ok(())
}
/// Expands a mix of files and directories into recording paths. Files are
/// kept as given; directories are searched recursively.
pub fn expand_inputs(inputs: &[PathBuf], extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(find_recordings(input, extension)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn finds_nested_files_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("subject01").join("session2");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.edf"), b"").unwrap();
        fs::write(nested.join("a.edf"), b"").unwrap();
        fs::write(nested.join("notes.txt"), b"").unwrap();
        let found = find_recordings(dir.path(), "edf").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().unwrap() == "edf"));
        let expanded = expand_inputs(&[dir.path().to_path_buf(), PathBuf::from("extra.edf")], "edf").unwrap();
        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded[2], PathBuf::from("extra.edf"));
    }
    #[test]
    fn missing_directory_is_an_error() {
        assert!(find_recordings(Path::new("/definitely/not/here"), "edf").is_err());
    }
}
