use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(author, version, about = "Posts build results to a chat webhook", long_about = None)]
pub struct Cli {
    /// Chemin du fichier de configuration TOML.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fichier de builds (un objet JSON par ligne) à lire au lieu de stdin.
    #[arg(long, value_name = "PATH")]
    pub events: Option<PathBuf>,

    /// Valide la configuration, affiche toutes les erreurs puis quitte.
    #[arg(long, action = ArgAction::SetTrue)]
    pub check: bool,

    /// N'envoie rien, logue uniquement les messages qui seraient postés.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Utilise un layer JSON pour les logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Filtre de logs explicite (ex. "build_notify=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn parses_flags() {
        let cli = match Cli::try_parse_from([
            "build-notify",
            "--config",
            "notify.toml",
            "--events",
            "builds.jsonl",
            "--dry-run",
        ]) {
            Ok(cli) => cli,
            Err(err) => panic!("arguments rejected: {err}"),
        };
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("notify.toml")));
        assert!(cli.dry_run);
        assert!(!cli.check);
    }
}
