use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "rulestream")]
#[command(
    author,
    version,
    about = "Streaming rule classification over websockets"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the classification server
    Serve(ServeArgs),

    /// Evaluate one rule against one subject and print the verdict
    Eval {
        /// Rule expression, e.g. "count('a') > 2"
        rule: String,

        /// Text to classify
        subject: String,
    },

    /// Validate every rule in a YAML rule file
    Check {
        /// Rule file path
        #[arg(default_value = "./rules.yaml")]
        path: String,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Options for `rulestream serve`
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "rulestream.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// YAML file with the initial rule set
    #[arg(short, long)]
    pub rules: Option<String>,

    /// Bearer token required by the rule administration endpoints
    #[arg(long, env = "RULESTREAM_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
