// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! View-models mirroring backend JSON. The backend is the source of truth and
//! may omit or null any of these fields, so nearly everything is optional.

use std::collections::BTreeMap;
use std::fmt;

use comfy_table::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuyerStatus {
    Verified,
    Pending,
    Informal,
    Suspicious,
    #[serde(other)]
    Unknown,
}

impl BuyerStatus {
    /// Display label and colour; unknown values fall back to pending.
    pub fn badge(status: Option<BuyerStatus>) -> (&'static str, Color) {
        match status {
            Some(BuyerStatus::Verified) => ("Verified", Color::Green),
            Some(BuyerStatus::Informal) => ("Informal", Color::Red),
            Some(BuyerStatus::Suspicious) => ("Suspicious", Color::DarkRed),
            Some(BuyerStatus::Pending) | Some(BuyerStatus::Unknown) | None => {
                ("Pending", Color::Yellow)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buyer {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub ruc: Option<String>,
    pub classification: Option<String>,
    pub status: Option<BuyerStatus>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub risk_notes: Option<String>,
}

impl Buyer {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBuyer {
    pub ruc: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub classification: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceQuote {
    pub price: Option<f64>,
    pub unit: Option<String>,
    pub source: Option<String>,
    pub fetched_at: Option<String>,
}

/// Envelope of `GET /prices/latest`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PriceBoard {
    pub data: Option<BTreeMap<String, PriceQuote>>,
    pub message: Option<String>,
}

impl PriceBoard {
    pub fn quote(&self, symbol: &str) -> Option<&PriceQuote> {
        self.data.as_ref()?.get(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mineral {
    Oro,
    Plata,
    Cobre,
}

impl Mineral {
    pub const ALL: [Mineral; 3] = [Mineral::Oro, Mineral::Plata, Mineral::Cobre];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mineral::Oro => "oro",
            Mineral::Plata => "plata",
            Mineral::Cobre => "cobre",
        }
    }

    pub fn parse(s: &str) -> Option<Mineral> {
        match s.trim().to_lowercase().as_str() {
            "oro" | "gold" => Some(Mineral::Oro),
            "plata" | "silver" => Some(Mineral::Plata),
            "cobre" | "copper" => Some(Mineral::Cobre),
            _ => None,
        }
    }
}

impl fmt::Display for Mineral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRequest {
    pub buyer_id: i64,
    pub mineral_type: String,
    pub quantity_kg: f64,
    pub law_percentage: f64,
    pub recovery_percentage: f64,
    pub freight_cost_pen: f64,
    pub discounts_percentage: f64,
    pub taxes_percentage: f64,
}

impl BudgetRequest {
    pub const DEFAULT_RECOVERY: f64 = 95.0;
    pub const DEFAULT_FREIGHT: f64 = 0.0;
    pub const DEFAULT_DISCOUNTS: f64 = 0.0;
    /// IGV
    pub const DEFAULT_TAXES: f64 = 18.0;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetDetails {
    pub usable_kg: Option<f64>,
    pub base_price_usd: Option<f64>,
    pub base_price_pen: Option<f64>,
    pub discounted_price: Option<f64>,
    pub freight_cost_pen: Option<f64>,
    pub net_before_tax: Option<f64>,
    pub taxes: Option<f64>,
    pub final_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    pub buyer_id: Option<i64>,
    pub mineral_type: Option<String>,
    pub quantity_kg: Option<f64>,
    pub law_percentage: Option<f64>,
    pub recovery_percentage: Option<f64>,
    pub metal_price_usd_oz: Option<f64>,
    pub fx_rate: Option<f64>,
    pub total_amount_pen: Option<f64>,
    pub details: Option<BudgetDetails>,
    /// Set by the backend instead of an error status when prices are missing.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_active(status: Option<TaskStatus>) -> bool {
        matches!(status, Some(TaskStatus::Pending) | Some(TaskStatus::Processing))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub parameters: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub created_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskList {
    pub total: Option<u64>,
    pub tasks: Option<Vec<Task>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskCreated {
    pub task_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: usize,
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RucRecord {
    pub ruc: Option<String>,
    pub name: Option<String>,
    pub business_name: Option<String>,
    pub status: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DniRecord {
    pub dni: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// `{status, data}` wrapper used by the registry endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}
