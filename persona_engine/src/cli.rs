use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Boots a persona configuration and drives environment switches",
    version
)]
pub struct Args {
    /// Path to the JSON configuration document
    #[arg(long)]
    pub config: PathBuf,

    /// Directory script resources are resolved against (default: the config's directory)
    #[arg(long)]
    pub scripts_root: Option<PathBuf>,

    /// Environment id to switch to after boot; repeatable, applied in order ("root" allowed)
    #[arg(long = "switch", value_name = "ID")]
    pub switches: Vec<String>,

    /// Lua chunk to run in the active environment once all switches are applied; repeatable
    #[arg(long = "exec", value_name = "CHUNK")]
    pub chunks: Vec<String>,

    /// Number of TICK events to fire after each switch
    #[arg(long, default_value_t = 0)]
    pub ticks: u32,

    /// Path to write the engine summary as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Raise the default log filter to debug
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub struct RunArgs {
    pub config: PathBuf,
    pub scripts_root: PathBuf,
    pub switches: Vec<String>,
    pub chunks: Vec<String>,
    pub ticks: u32,
    pub summary_json: Option<PathBuf>,
    pub verbose: bool,
}

pub fn parse() -> Result<RunArgs> {
    Args::parse().into_run_args()
}

impl Args {
    fn into_run_args(self) -> Result<RunArgs> {
        if self.switches.iter().any(|id| id.trim().is_empty()) {
            bail!("--switch requires a non-empty environment id");
        }
        let scripts_root = match self.scripts_root {
            Some(root) => root,
            None => self
                .config
                .parent()
                .map(|parent| parent.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        Ok(RunArgs {
            config: self.config,
            scripts_root,
            switches: self.switches,
            chunks: self.chunks,
            ticks: self.ticks,
            summary_json: self.summary_json,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn scripts_root_defaults_to_config_directory() {
        let args = Args::try_parse_from([
            "persona_engine",
            "--config",
            "personas/config.json",
            "--switch",
            "alice",
            "--switch",
            "root",
        ])
        .expect("parse");
        let run = args.into_run_args().expect("run args");
        assert_eq!(run.scripts_root, PathBuf::from("personas"));
        assert_eq!(run.switches, ["alice", "root"]);
        assert_eq!(run.ticks, 0);
    }

    #[test]
    fn blank_switch_is_rejected() {
        let args =
            Args::try_parse_from(["persona_engine", "--config", "c.json", "--switch", " "])
                .expect("parse");
        assert!(args.into_run_args().is_err());
    }
}
