use std::path::PathBuf;

use clap::Parser;

use crate::settings::{DisciplineSetting, Settings};

#[derive(Debug, Parser)]
#[command(name = "wordtally")]
#[command(about = "Count words across the .docx/.doc files of a folder", version)]
pub struct Cli {
    /// Folder holding the documents; the report is written here too
    #[arg(default_value = ".")]
    pub folder: PathBuf,

    /// Extract one file at a time instead of parsing .docx files in parallel
    #[arg(long)]
    pub sequential: bool,

    /// RON settings file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Also write the diagnostic log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Program used to drive the word processor for .doc files
    #[arg(long)]
    pub automation_program: Option<String>,

    /// Log debug output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Command-line flags win over the settings file.
    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if self.sequential {
            settings.discipline = DisciplineSetting::Sequential;
        }
        if let Some(program) = &self.automation_program {
            settings.automation_program = program.clone();
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use tally_engine::Discipline;

    use super::Cli;
    use crate::settings::Settings;

    #[test]
    fn folder_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["wordtally"]).unwrap();
        assert_eq!(cli.folder, PathBuf::from("."));
        assert!(!cli.sequential);
        assert_eq!(
            cli.apply_overrides(Settings::default()).discipline(),
            Discipline::Concurrent
        );
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::try_parse_from([
            "wordtally",
            "E:/MyFolder",
            "--sequential",
            "--automation-program",
            "pwsh",
        ])
        .unwrap();
        let settings = cli.apply_overrides(Settings::default());
        assert_eq!(cli.folder, PathBuf::from("E:/MyFolder"));
        assert_eq!(settings.discipline(), Discipline::Sequential);
        assert_eq!(settings.automation_program, "pwsh");
    }

    #[test]
    fn only_one_folder_is_accepted() {
        assert!(Cli::try_parse_from(["wordtally", "a", "b"]).is_err());
    }
}
