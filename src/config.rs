use crate::utils::normalize_lines;
use clap::{Args, Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

#[derive(Parser, Debug)]
#[command(version, about = "Public transit stops of Grenoble, merged per physical stop")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every command. Flags win over the environment (and `.env`).
#[derive(Args, Debug, Clone)]
pub struct Config {
    #[arg(
        long,
        env = "TRANSIT_API_URL",
        default_value = "https://data.mobilites-m.fr",
        global = true
    )]
    pub transit_api_url: String,

    /// Prefix of the route ids, as in `SEM:A`
    #[arg(long, env = "TRANSIT_NETWORK", default_value = "SEM", global = true)]
    pub network: String,

    #[arg(
        long,
        env = "TRANSIT_LINES",
        default_value = "A,B,C",
        value_delimiter = ',',
        global = true
    )]
    pub lines: Vec<String>,

    #[arg(
        long,
        env = "GEOCODER_API_URL",
        default_value = "https://api-adresse.data.gouv.fr",
        global = true
    )]
    pub geocoder_api_url: String,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub http_timeout_secs: u64,

    /// Traces are only exported when set
    #[arg(long, env = "OTLP_ENDPOINT", global = true)]
    pub otlp_endpoint: Option<String>,

    #[arg(long, env = "LOG_DIR", default_value = "./logs", global = true)]
    pub log_dir: PathBuf,
}

impl Config {
    pub fn lines(&self) -> Vec<String> {
        normalize_lines(&self.lines)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print one marker per stop of every configured line
    Stops {
        /// Print GeoJSON instead of text
        #[arg(long)]
        geojson: bool,
    },
    /// List the stops of one line
    Line { line: String },
    /// Find an address and print the map region centered on it
    Search {
        query: String,

        /// Also print the stops visible around the address
        #[arg(long)]
        stops: bool,
    },
    /// Print address suggestions for a partial query
    Suggest { text: String },
    /// Serve the stops and the address search over HTTP
    Serve {
        #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use itertools::Itertools;

    fn default_of(id: &str) -> Vec<String> {
        Cli::command()
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .unwrap()
            .get_default_values()
            .iter()
            .map(|value| value.to_string_lossy().to_string())
            .collect_vec()
    }

    #[test]
    fn defaults_to_tram_lines_a_b_c() {
        assert_eq!(default_of("lines"), vec!["A,B,C"]);
        assert_eq!(default_of("network"), vec!["SEM"]);
        assert_eq!(default_of("http_timeout_secs"), vec!["10"]);
    }

    #[test]
    fn explicit_flags_win() {
        let cli = Cli::try_parse_from([
            "grenoble_stops",
            "stops",
            "--network",
            "TAG",
            "--lines",
            "A,B,C",
        ])
        .unwrap();

        assert_eq!(cli.config.lines(), vec!["A", "B", "C"]);
        assert_eq!(cli.config.network, "TAG");
        assert!(matches!(cli.command, Command::Stops { geojson: false }));
    }

    #[test]
    fn lines_are_comma_separated() {
        let cli =
            Cli::try_parse_from(["grenoble_stops", "stops", "--lines", "E, C,,E"]).unwrap();

        assert_eq!(cli.config.lines(), vec!["E", "C"]);
    }

    #[test]
    fn search_takes_a_query() {
        let cli = Cli::try_parse_from(["grenoble_stops", "search", "gare", "--stops"]).unwrap();

        match cli.command {
            Command::Search { query, stops } => {
                assert_eq!(query, "gare");
                assert!(stops);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
