use crate::types::{Program, TuringMachineError};

use tracing::error;

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 3] = [
    ("binary-increment", include_str!("../demos/binary-increment.tm")),
    ("invert", include_str!("../demos/invert.tm")),
    ("busy-beaver-2", include_str!("../demos/busy-beaver-2.tm")),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = load_embedded();
}

fn load_embedded() -> Vec<Program> {
    PROGRAM_TEXTS
        .iter()
        .filter_map(|(name, text)| match crate::parser::parse(text) {
            Ok(program) => Some(Program {
                name: name.to_string(),
                ..program
            }),
            Err(e) => {
                error!(name, error = %e, "failed to parse embedded program");
                None
            }
        })
        .collect()
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS.get(index).cloned().ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| TuringMachineError::ValidationError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|p| p.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::machine::{Machine, RunOptions};
    use crate::types::HaltReason;

    #[test]
    fn test_all_embedded_programs_parse() {
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_TEXTS.len());
        assert_eq!(
            ProgramManager::list_program_names(),
            vec!["binary-increment", "invert", "busy-beaver-2"]
        );
    }

    #[test]
    fn test_embedded_programs_are_clean() {
        for program in PROGRAMS.iter() {
            assert!(analyze(program).is_empty(), "{} has warnings", program.name);
        }
    }

    #[test]
    fn test_get_program_by_index() {
        let program = ProgramManager::get_program_by_index(0).unwrap();
        assert_eq!(program.name, "binary-increment");
        assert!(ProgramManager::get_program_by_index(99).is_err());
    }

    #[test]
    fn test_binary_increment() {
        let program = ProgramManager::get_program_by_name("binary-increment").unwrap();
        let outcome = Machine::from(&program).run(RunOptions::default());

        assert_eq!(outcome.reason, HaltReason::Accepted);
        assert_eq!(outcome.tape, "1100_");
        assert_eq!(outcome.head, 1);
    }

    #[test]
    fn test_binary_increment_carries_past_origin() {
        let mut program = ProgramManager::get_program_by_name("binary-increment").unwrap();
        program.tape = "111".to_string();

        let mut machine = Machine::from(&program);
        let outcome = machine.run(RunOptions::default());

        assert_eq!(outcome.reason, HaltReason::Accepted);
        assert_eq!(outcome.head, -1);
        assert_eq!(machine.tape_window(-1, 3), vec!['1', '0', '0', '0']);
    }

    #[test]
    fn test_invert() {
        let program = ProgramManager::get_program_by_name("invert").unwrap();
        let outcome = Machine::from(&program).run(RunOptions::default());

        assert_eq!(outcome.reason, HaltReason::Accepted);
        assert_eq!(outcome.tape, "1001_");
        assert_eq!(outcome.steps, 5);
    }

    #[test]
    fn test_busy_beaver() {
        let program = ProgramManager::get_program_by_name("busy-beaver-2").unwrap();
        let mut machine = Machine::from(&program);
        let outcome = machine.run(RunOptions::default());

        assert_eq!(outcome.reason, HaltReason::Accepted);
        assert_eq!(outcome.steps, 6);
        assert_eq!(outcome.tape, "1111");
        assert_eq!(machine.tape().min_address(), -2);
    }

    #[test]
    fn test_unknown_program() {
        assert!(ProgramManager::get_program_by_name("missing").is_err());
    }
}
