use serde::Deserialize;

/// Indication construction settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ManagerConfig {
    /// Namespace watched object paths are constructed in
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Property name the delivery timestamp is stamped under
    #[serde(default = "default_indication_time_property")]
    pub indication_time_property: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            indication_time_property: default_indication_time_property(),
        }
    }
}

fn default_namespace() -> String {
    "root/cimv2".to_string()
}
fn default_indication_time_property() -> String {
    "IndicationTime".to_string()
}
