//! This module provides the `ProgramLoader` struct, responsible for loading programs from
//! rule files, JSON documents and strings.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of rule files.
pub const RULE_FILE_EXTENSION: &str = "tm";
/// Extension of JSON program documents.
pub const JSON_EXTENSION: &str = "json";

/// `ProgramLoader` is a utility struct for loading programs.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all program files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// Files with a `.json` extension are read as a serialized `Program`; everything else
    /// is parsed as a rule file. Programs loaded from disk are named after the file stem
    /// unless the document names itself.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ParseError)` or `Err(TuringMachineError::JsonError)` if the
    ///   content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let mut program = if path.extension().is_some_and(|ext| ext == JSON_EXTENSION) {
            Self::load_program_from_json(&content)?
        } else {
            parse(&content)?
        };

        if program.name.is_empty() {
            if let Some(stem) = path.file_stem() {
                program.name = stem.to_string_lossy().into_owned();
            }
        }

        Ok(program)
    }

    /// Loads a single program from rule file content.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        parse(content)
    }

    /// Loads a single program from a JSON document.
    pub fn load_program_from_json(content: &str) -> Result<Program, TuringMachineError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads all program files (`.tm` and `.json`) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each element of the result
    /// either holds the path and the loaded program or the error that occurred.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir() || !Self::is_program_file(&path) {
                    return None;
                }

                match Self::load_program(&path) {
                    Ok(program) => Some(Ok((path, program))),
                    Err(e) => Some(Err(TuringMachineError::FileError(format!(
                        "Failed to load program from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect();

        // `read_dir` order is platform dependent.
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }

    fn is_program_file(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == RULE_FILE_EXTENSION || ext == JSON_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID_PROGRAM: &str = "aaa\n0\n0 0 0 a b 1\nend:1\n";

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("flip.tm");
        write_file(&file_path, VALID_PROGRAM);

        let program = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(program.name, "flip");
        assert_eq!(program.tape, "aaa");
        assert_eq!(program.rules.len(), 1);
        assert_eq!(program.accepting, vec![1]);
    }

    #[test]
    fn test_load_json_program() {
        let dir = tempdir().unwrap();
        let program = ProgramLoader::load_program_from_string(VALID_PROGRAM).unwrap();
        let file_path = dir.path().join("copy.json");
        write_file(&file_path, &serde_json::to_string(&program).unwrap());

        let loaded = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(loaded.name, "copy");
        assert_eq!(loaded.rules, program.rules);
        assert_eq!(loaded.tape, program.tape);
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        write_file(&file_path, "This is not a valid program");

        assert!(ProgramLoader::load_program(&file_path).is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        assert!(matches!(
            ProgramLoader::load_program_from_json("{\"tape\": 3}"),
            Err(TuringMachineError::JsonError(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ProgramLoader::load_program(Path::new("file_does_not_exist.tm"));
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.tm"), VALID_PROGRAM);
        write_file(&dir.path().join("invalid.tm"), "This is not a valid program");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");

        let results = ProgramLoader::load_programs(dir.path());

        // We should have 2 results: 1 success and 1 error
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_load_programs_missing_directory() {
        let results = ProgramLoader::load_programs(Path::new("no/such/directory"));
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
