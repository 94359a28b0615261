use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;

/// IPL match winner predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "ipl-predictor", version, about)]
pub struct Config {
    /// Trained classifier artifact (JSON)
    #[arg(long, env = "MODEL_PATH", default_value = "ipl_model.json")]
    pub model_path: String,

    /// Fitted scaler artifact (JSON)
    #[arg(long, env = "SCALER_PATH", default_value = "scaler.json")]
    pub scaler_path: String,

    /// Form page listen address
    #[arg(long, env = "FORM_ADDR", default_value = "127.0.0.1:8501")]
    pub form_addr: String,

    /// Skip the startup warmup prediction
    #[arg(long, env = "SKIP_WARMUP", default_value = "false")]
    pub skip_warmup: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (what, path) in [("model", &self.model_path), ("scaler", &self.scaler_path)] {
            if !Path::new(path).is_file() {
                anyhow::bail!("{} artifact not found at {}", what, path);
            }
        }
        if self.form_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!("form_addr must be a socket address, got {}", self.form_addr);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(model_path: &str, scaler_path: &str, addr: &str) -> Config {
        Config {
            model_path: model_path.into(),
            scaler_path: scaler_path.into(),
            form_addr: addr.into(),
            skip_warmup: false,
        }
    }

    fn touch(name: &str) -> String {
        let path = std::env::temp_dir().join(format!("ipl-config-{}-{}", std::process::id(), name));
        std::fs::write(&path, "{}").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn defaults_parse_from_empty_args() {
        let cfg = Config::parse_from(["ipl-predictor"]);
        assert_eq!(cfg.model_path, "ipl_model.json");
        assert_eq!(cfg.scaler_path, "scaler.json");
        assert_eq!(cfg.form_addr, "127.0.0.1:8501");
        assert!(!cfg.skip_warmup);
    }

    #[test]
    fn validate_rejects_missing_artifact() {
        let scaler = touch("scaler-only.json");
        let cfg = config_with("/definitely/not/here.json", &scaler, "127.0.0.1:8501");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("model artifact not found"));
    }

    #[test]
    fn validate_rejects_bad_address() {
        let model = touch("model-a.json");
        let scaler = touch("scaler-a.json");
        let cfg = config_with(&model, &scaler, "localhost");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_existing_files() {
        let model = touch("model-b.json");
        let scaler = touch("scaler-b.json");
        let cfg = config_with(&model, &scaler, "0.0.0.0:9000");
        assert!(cfg.validate().is_ok());
    }
}
