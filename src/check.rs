// Copyright (C) 2025 Nuwaira
// All Rights Reserved.
//
// NOTICE: All information contained herein is, and remains
// the property of Nuwaira.
// The intellectual and technical concepts contained
// herein are proprietary to Nuwaira
// and are protected by trade secret or copyright law.
// Dissemination of this information or reproduction of this material
// is strictly forbidden unless prior written permission is obtained
// from Nuwaira.
use crate::client::DatabricksClient;
use crate::config::Config;

/// Probe the workspace the way an operator would before wiring the server
/// into an MCP client. Prints one line per step; returns whether all passed.
pub async fn check_connection(config: &Config) -> bool {
    let credentials = match &config.credentials {
        Ok(credentials) => {
            println!("✅ All required environment variables are set");
            credentials
        }
        Err(msg) => {
            println!("❌ {}", msg);
            println!("\nSet them in the environment or in a .env file in the working directory.");
            return false;
        }
    };

    let client = match DatabricksClient::new(credentials, config.settings.clone()) {
        Ok(client) => client,
        Err(e) => {
            println!("❌ {}", e);
            return false;
        }
    };

    let mut ok = true;

    println!("\nTesting Databricks API connection...");
    match client.check_api().await {
        Ok(()) => println!("✅ Successfully connected to Databricks API"),
        Err(e) => {
            println!("❌ Failed to connect to Databricks API: {}", e);
            ok = false;
        }
    }

    println!("\nTesting SQL warehouse connection...");
    match client.execute_query("SELECT 1 AS test").await {
        Ok(result) if result.rows.len() == 1 => {
            println!("✅ Successfully connected to Databricks SQL warehouse")
        }
        Ok(result) => {
            println!(
                "❌ Unexpected result from test query: {} row(s)",
                result.rows.len()
            );
            ok = false;
        }
        Err(e) => {
            println!("❌ Failed to query the SQL warehouse: {}", e);
            ok = false;
        }
    }

    if ok {
        println!("\n✅ All connection checks passed");
    } else {
        println!("\n❌ Some connection checks failed");
    }
    ok
}
