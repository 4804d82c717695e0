use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scriptheal - evaluate analysis scripts and repair missing dependencies once
#[derive(Parser, Debug)]
#[command(name = "scriptheal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the script in WORK_DIR with the runtime for the given type
    Evaluate {
        /// Script type: node (nodejs, js) or python (py)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        script_type: String,

        /// Job directory containing the entry script (default layout: script/script.sc)
        #[arg(value_name = "WORK_DIR")]
        work_dir: PathBuf,

        /// Script argument as KEY=VALUE, repeatable; order is kept. A bare KEY passes a flag.
        #[arg(long = "arg", short = 'a', value_name = "KEY=VALUE")]
        args: Vec<String>,

        /// Overall deadline in seconds, repair included (default: from env or none)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Classify failure text and print the verdict as JSON
    Classify {
        /// File with captured stderr. Use "-" (default) to read from stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,
    },
}
