use crate::DEFAULT_IMAGE_SIZE;

/// Runtime settings for the viewer server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Width and height of every depiction, in pixels.
    pub image_size: u32,
    pub log_level: String,
}

impl Config {
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            image_size: DEFAULT_IMAGE_SIZE,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 8080));
        assert_eq!(config.image_size, 400);
        assert_eq!(config.log_level, "info");
    }
}
