use argh::FromArgs;
use softlens::imgproc::filter::{EdgePolicy, FilterError, Kernel2d};

/// Port used when neither `--port` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 5000;

#[derive(FromArgs, Debug)]
/// Serve the softlens image blur api over HTTP
pub struct Args {
    /// port to listen on, defaults to $PORT or 5000
    #[argh(option, short = 'p')]
    pub port: Option<u16>,

    /// size of the square box blur kernel
    #[argh(option, default = "20")]
    pub kernel_size: usize,

    /// edge policy of the blur: no-op, zero or clamp
    #[argh(option, default = "EdgePolicy::NoOp")]
    pub edge_policy: EdgePolicy,

    /// maximum size in bytes of an uploaded image
    #[argh(option, default = "1_000_000")]
    pub max_file_size: usize,

    /// maximum number of pixels of a decoded image
    #[argh(option, default = "16_000_000")]
    pub max_pixels: u64,

    /// maximum number of images filtered at the same time
    #[argh(option, default = "4")]
    pub max_concurrency: usize,

    /// quality of the returned jpeg, from 1 to 100
    #[argh(option, default = "90")]
    pub jpeg_quality: u8,
}

/// Errors raised while validating the server configuration.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The port from the environment is not a valid port number.
    #[error("invalid PORT value: {0:?}")]
    InvalidPort(String),

    /// The blur kernel cannot be built.
    #[error("invalid blur kernel: {0}")]
    InvalidKernel(#[from] FilterError),

    /// The concurrency limit must be at least one.
    #[error("max concurrency must be > 0")]
    InvalidConcurrency,

    /// The file size limit must be at least one byte.
    #[error("max file size must be > 0")]
    InvalidFileSize,

    /// The pixel limit must be at least one pixel.
    #[error("max pixels must be > 0")]
    InvalidMaxPixels,

    /// The jpeg quality is out of range.
    #[error("jpeg quality must be in 1..=100, got {0}")]
    InvalidQuality(u8),
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub port: u16,
    pub kernel: Kernel2d,
    pub edge_policy: EdgePolicy,
    pub max_file_size: usize,
    pub max_pixels: u64,
    pub max_concurrency: usize,
    pub jpeg_quality: u8,
}

impl ServeConfig {
    /// Build the configuration from the command line, falling back to `env_port` for the port.
    pub fn from_args(args: Args, env_port: Option<&str>) -> Result<Self, ConfigError> {
        let port = match (args.port, env_port) {
            (Some(port), _) => port,
            (None, Some(env_port)) => env_port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(env_port.to_string()))?,
            (None, None) => DEFAULT_PORT,
        };

        if args.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if args.max_file_size == 0 {
            return Err(ConfigError::InvalidFileSize);
        }
        if args.max_pixels == 0 {
            return Err(ConfigError::InvalidMaxPixels);
        }
        if !(1..=100).contains(&args.jpeg_quality) {
            return Err(ConfigError::InvalidQuality(args.jpeg_quality));
        }

        Ok(Self {
            port,
            kernel: Kernel2d::box_blur(args.kernel_size)?,
            edge_policy: args.edge_policy,
            max_file_size: args.max_file_size,
            max_pixels: args.max_pixels,
            max_concurrency: args.max_concurrency,
            jpeg_quality: args.jpeg_quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["softlens-serve"], args).expect("valid arguments")
    }

    #[test]
    fn defaults() -> Result<(), ConfigError> {
        let config = ServeConfig::from_args(parse(&[]), None)?;
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.kernel, Kernel2d::box_blur(20)?);
        assert_eq!(config.edge_policy, EdgePolicy::NoOp);
        assert_eq!(config.max_file_size, 1_000_000);
        assert_eq!(config.max_pixels, 16_000_000);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.jpeg_quality, 90);
        Ok(())
    }

    #[test]
    fn port_resolution() -> Result<(), ConfigError> {
        let config = ServeConfig::from_args(parse(&[]), Some("8080"))?;
        assert_eq!(config.port, 8080);

        let config = ServeConfig::from_args(parse(&["--port", "3000"]), Some("8080"))?;
        assert_eq!(config.port, 3000);

        assert_eq!(
            ServeConfig::from_args(parse(&[]), Some("http")).map(|c| c.port),
            Err(ConfigError::InvalidPort("http".to_string()))
        );
        Ok(())
    }

    #[test]
    fn custom_blur() -> Result<(), ConfigError> {
        let args = parse(&["--kernel-size", "5", "--edge-policy", "clamp"]);
        let config = ServeConfig::from_args(args, None)?;
        assert_eq!(config.kernel.width, 5);
        assert_eq!(config.edge_policy, EdgePolicy::Clamp);
        Ok(())
    }

    #[test]
    fn invalid_values() {
        assert!(Args::from_args(&["softlens-serve"], &["--edge-policy", "wrap"]).is_err());

        let err = ServeConfig::from_args(parse(&["--kernel-size", "0"]), None).map(|c| c.port);
        assert!(matches!(err, Err(ConfigError::InvalidKernel(_))));

        let err = ServeConfig::from_args(parse(&["--max-concurrency", "0"]), None).map(|c| c.port);
        assert_eq!(err, Err(ConfigError::InvalidConcurrency));

        let err = ServeConfig::from_args(parse(&["--max-pixels", "0"]), None).map(|c| c.port);
        assert_eq!(err, Err(ConfigError::InvalidMaxPixels));

        let err = ServeConfig::from_args(parse(&["--jpeg-quality", "0"]), None).map(|c| c.port);
        assert_eq!(err, Err(ConfigError::InvalidQuality(0)));
    }
}
