use crate::core::config::data::{Config, ConfigKey, DEFAULT_BASE_URL};

impl Config {
    pub fn format_all(&self) -> String {
        let mut out = String::from("Current configuration:\n");
        for key in ConfigKey::ALL {
            let value = match key {
                ConfigKey::BaseUrl => match &self.base_url {
                    Some(url) => url.clone(),
                    None => format!("(unset, defaults to {DEFAULT_BASE_URL})"),
                },
                ConfigKey::DataPath => self
                    .data_path
                    .clone()
                    .unwrap_or_else(|| "(unset)".to_string()),
                ConfigKey::ShowToolResults => match self.show_tool_results.unwrap_or(true) {
                    true => "on".to_string(),
                    false => "off".to_string(),
                },
            };
            out.push_str(&format!("  {key}: {value}\n"));
        }
        out
    }

    pub fn print_all(&self) {
        print!("{}", self.format_all());
    }
}
