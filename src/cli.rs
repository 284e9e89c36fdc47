use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "lazypkg", version, about = "TUI for updating packages across package managers")]
pub struct Args {
    /// Show what would be updated without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Leave out a package manager (e.g., "gem" or "apt,npm")
    #[arg(long, value_name = "MANAGER", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Turn on an optional package manager (e.g., "docker")
    #[arg(long, value_name = "MANAGER", value_delimiter = ',')]
    pub enable_feature: Vec<String>,

    /// Use simulated package managers
    #[arg(long)]
    pub demo: bool,

    /// Number of lines kept in the output pane
    #[arg(long, value_name = "LINES")]
    pub log_capacity: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_and_comma_separated_values() {
        let args = Args::parse_from([
            "lazypkg",
            "--exclude",
            "apt,npm",
            "--exclude",
            "gem",
            "--enable-feature",
            "docker",
            "--dry-run",
        ]);

        assert_eq!(args.exclude, vec!["apt", "npm", "gem"]);
        assert_eq!(args.enable_feature, vec!["docker"]);
        assert!(args.dry_run);
        assert!(!args.demo);
        assert_eq!(args.log_capacity, None);
    }
}
