//! Cross-cutting helpers shared by the service and server crates:
//! logging setup, health payload, pagination and metrics.

pub mod types;
pub mod utils;
pub mod pagination;
pub mod metrics;
pub mod admin_http;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok", version: "0.1.0" };
        assert_eq!(h.status, "ok");
        let v = serde_json::to_value(&h).unwrap();
        assert_eq!(v["status"], "ok");
    }
}
