//! Operations command implementation
//!
//! Prints the static operation catalog.

use crate::adapters::cpq::{OperationDescriptor, OPERATION_CATALOG};
use crate::cli::EXIT_SUCCESS;
use clap::Args;
use serde_json::json;

/// Arguments for the operations command
#[derive(Args, Debug)]
pub struct OperationsArgs {
    /// Only list operations of this resource
    #[arg(short, long)]
    pub resource: Option<String>,

    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

impl OperationsArgs {
    /// Execute the operations command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let entries: Vec<&OperationDescriptor> = OPERATION_CATALOG
            .iter()
            .filter(|d| self.resource.as_deref().map_or(true, |r| d.resource == r))
            .collect();

        if self.json {
            let catalog: Vec<_> = entries
                .iter()
                .map(|d| {
                    json!({
                        "resource": d.resource,
                        "operation": d.operation,
                        "method": d.method.as_str(),
                        "path": d.path,
                        "kind": d.kind.as_str(),
                        "showAllVersions": d.show_all_versions,
                        "description": d.description,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&catalog)?);
            return Ok(EXIT_SUCCESS);
        }

        for descriptor in entries {
            println!("{}", format_row(descriptor));
        }
        Ok(EXIT_SUCCESS)
    }
}

fn format_row(d: &OperationDescriptor) -> String {
    format!(
        "{:<34} {:<7} {:<44} {}",
        d.to_string(),
        d.method.as_str(),
        d.path,
        d.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cpq::find_descriptor;

    #[test]
    fn test_format_row() {
        let row = format_row(find_descriptor("quotes", "copy").unwrap());
        assert!(row.starts_with("quotes.copy"));
        assert!(row.contains("POST"));
        assert!(row.contains("/api/quotes/copyById/{quoteId}"));
    }

    #[tokio::test]
    async fn test_execute_filtered() {
        let args = OperationsArgs {
            resource: Some("templates".to_string()),
            json: true,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_SUCCESS);
    }
}
