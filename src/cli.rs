use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::config::{
    AnalyzeConfig, BuildConfig, ChartSize, DEFAULT_MIN_JOIN_MATCH_RATE, GenerationColumns,
    JoinPolicy, LoadColumns,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the net load table, then analyze its cyclicality.
    Run(Box<RunArgs>),

    /// Build the net load table and its time-series chart.
    Build(Box<BuildArgs>),

    /// Analyze the cyclicality of a previously built net load table.
    Analyze(AnalyzeArgs),
}

#[derive(ClapArgs)]
pub struct RunArgs {
    #[clap(flatten)]
    pub build: BuildArgs,

    #[clap(flatten)]
    pub cyclicality: CyclicalityPlotArgs,
}

#[derive(ClapArgs)]
pub struct BuildArgs {
    /// Generation-by-source table.
    #[clap(long = "generation", env = "GENERATION_PATH")]
    pub generation_path: PathBuf,

    /// Historical hourly load forecast table.
    #[clap(long = "load", env = "LOAD_PATH")]
    pub load_path: PathBuf,

    #[clap(flatten)]
    pub net_load: NetLoadOutArgs,

    /// Net load chart; the extension picks the format (`.svg` or a raster image).
    #[clap(
        long = "net-load-plot",
        env = "NET_LOAD_PLOT_PATH",
        default_value = "net_load_plot.png"
    )]
    pub net_load_plot: PathBuf,

    #[clap(long = "net-load-plot-width", default_value_t = ChartSize::NET_LOAD.width)]
    pub plot_width: u32,

    #[clap(long = "net-load-plot-height", default_value_t = ChartSize::NET_LOAD.height)]
    pub plot_height: u32,

    #[clap(flatten)]
    pub generation_columns: GenerationColumnArgs,

    #[clap(flatten)]
    pub load_columns: LoadColumnArgs,

    /// Warn when fewer load rows than this fraction find renewable output.
    #[clap(long, env = "MIN_JOIN_MATCH_RATE", default_value_t = DEFAULT_MIN_JOIN_MATCH_RATE)]
    pub min_join_match_rate: f64,

    /// Fail instead of warning when the join match rate is too low.
    #[clap(long, env = "STRICT_JOIN")]
    pub strict_join: bool,
}

#[derive(ClapArgs)]
pub struct NetLoadOutArgs {
    /// Net load table written by `build` and read by `analyze`.
    #[clap(
        id = "net_load_out",
        long = "net-load-out",
        value_name = "PATH",
        env = "NET_LOAD_PATH",
        default_value = "net_load_data.csv"
    )]
    pub path: PathBuf,
}

#[derive(ClapArgs)]
pub struct GenerationColumnArgs {
    #[clap(long, default_value = "datetime_beginning_utc")]
    pub generation_timestamp_column: String,

    #[clap(long, default_value = "is_renewable")]
    pub generation_renewable_column: String,

    #[clap(long, default_value = "mw")]
    pub generation_power_column: String,
}

#[derive(ClapArgs)]
pub struct LoadColumnArgs {
    #[clap(long, default_value = "forecast_hour_beginning_utc")]
    pub load_timestamp_column: String,

    #[clap(long, default_value = "forecast_load_mw")]
    pub load_forecast_column: String,
}

#[derive(ClapArgs)]
pub struct CyclicalityPlotArgs {
    /// Autocorrelation stem chart.
    #[clap(
        id = "cyclicality_plot",
        long = "cyclicality-plot",
        value_name = "PATH",
        env = "CYCLICALITY_PLOT_PATH",
        default_value = "cyclic_plot.png"
    )]
    pub path: PathBuf,

    #[clap(long = "cyclicality-plot-width", default_value_t = ChartSize::CYCLICALITY.width)]
    pub width: u32,

    #[clap(long = "cyclicality-plot-height", default_value_t = ChartSize::CYCLICALITY.height)]
    pub height: u32,
}

#[derive(ClapArgs)]
pub struct AnalyzeArgs {
    #[clap(flatten)]
    pub net_load: NetLoadOutArgs,

    #[clap(flatten)]
    pub cyclicality: CyclicalityPlotArgs,
}

impl From<&BuildArgs> for BuildConfig {
    fn from(args: &BuildArgs) -> Self {
        Self {
            generation_path: args.generation_path.clone(),
            load_path: args.load_path.clone(),
            net_load_out: args.net_load.path.clone(),
            net_load_plot: Some(args.net_load_plot.clone()),
            generation_columns: GenerationColumns {
                timestamp: args.generation_columns.generation_timestamp_column.clone(),
                is_renewable: args.generation_columns.generation_renewable_column.clone(),
                power_mw: args.generation_columns.generation_power_column.clone(),
            },
            load_columns: LoadColumns {
                timestamp: args.load_columns.load_timestamp_column.clone(),
                forecast_load_mw: args.load_columns.load_forecast_column.clone(),
            },
            join_policy: JoinPolicy {
                min_match_rate: args.min_join_match_rate,
                strict: args.strict_join,
            },
            chart_size: ChartSize {
                width: args.plot_width,
                height: args.plot_height,
            },
        }
    }
}

impl From<&RunArgs> for BuildConfig {
    fn from(args: &RunArgs) -> Self {
        Self::from(&args.build)
    }
}

impl AnalyzeConfig {
    fn from_args(net_load: &NetLoadOutArgs, plot: &CyclicalityPlotArgs) -> Self {
        Self {
            net_load_path: net_load.path.clone(),
            cyclicality_plot: Some(plot.path.clone()),
            chart_size: ChartSize {
                width: plot.width,
                height: plot.height,
            },
        }
    }
}

impl From<&AnalyzeArgs> for AnalyzeConfig {
    fn from(args: &AnalyzeArgs) -> Self {
        Self::from_args(&args.net_load, &args.cyclicality)
    }
}

impl From<&RunArgs> for AnalyzeConfig {
    fn from(args: &RunArgs) -> Self {
        Self::from_args(&args.build.net_load, &args.cyclicality)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("net_load").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_run_defaults() {
        let args = parse(&["run", "--generation", "gen.csv", "--load", "load.csv"]);
        let Command::Run(run) = args.command else {
            panic!("expected the run command");
        };

        let build = BuildConfig::from(&*run);
        assert_eq!(build.generation_path, PathBuf::from("gen.csv"));
        assert_eq!(build.net_load_out, PathBuf::from("net_load_data.csv"));
        assert_eq!(build.net_load_plot, Some(PathBuf::from("net_load_plot.png")));
        assert_eq!(build.generation_columns, GenerationColumns::default());
        assert_eq!(build.load_columns, LoadColumns::default());
        assert_eq!(build.join_policy, JoinPolicy::default());
        assert_eq!(build.chart_size, ChartSize::NET_LOAD);

        let analyze = AnalyzeConfig::from(&*run);
        assert_eq!(analyze.net_load_path, build.net_load_out);
        assert_eq!(analyze.cyclicality_plot, Some(PathBuf::from("cyclic_plot.png")));
        assert_eq!(analyze.chart_size, ChartSize::CYCLICALITY);
    }

    #[test]
    fn test_build_overrides() {
        let args = parse(&[
            "build",
            "--generation",
            "g.csv",
            "--load",
            "l.csv",
            "--net-load-out",
            "out/net.csv",
            "--net-load-plot",
            "out/net.svg",
            "--load-timestamp-column",
            "hour",
            "--strict-join",
            "--min-join-match-rate",
            "0.5",
        ]);
        let Command::Build(build) = args.command else {
            panic!("expected the build command");
        };

        let config = BuildConfig::from(&*build);
        assert_eq!(config.net_load_out, PathBuf::from("out/net.csv"));
        assert_eq!(config.net_load_plot, Some(PathBuf::from("out/net.svg")));
        assert_eq!(config.load_columns.timestamp, "hour");
        assert!(config.join_policy.strict);
        assert_eq!(config.join_policy.min_match_rate, 0.5);
    }

    #[test]
    fn test_analyze() {
        let args = parse(&[
            "analyze",
            "--net-load-out",
            "net.csv",
            "--cyclicality-plot",
            "c.png",
        ]);
        let Command::Analyze(analyze) = args.command else {
            panic!("expected the analyze command");
        };

        let config = AnalyzeConfig::from(&analyze);
        assert_eq!(config.net_load_path, PathBuf::from("net.csv"));
        assert_eq!(config.cyclicality_plot, Some(PathBuf::from("c.png")));
    }

    #[test]
    fn test_build_requires_inputs() {
        let result = Args::try_parse_from(["net_load", "build", "--load", "l.csv"]);
        assert!(result.is_err());
    }
}
