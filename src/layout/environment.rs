// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Serialize;

use crate::config::Config;

/// The environment variables selected by a configuration.
#[derive(Debug, Clone)]
pub(crate) struct Environments {
    names: Vec<String>,
    show_name: bool,
    show_nullable: bool,
}

#[derive(Serialize)]
struct NamedValue<'a> {
    name: &'a str,
    value: Option<&'a str>,
}

impl Environments {
    /// `None` when no environment variable is selected.
    pub(crate) fn from_config(config: &Config) -> Option<Self> {
        if config.environments.is_empty() {
            return None;
        }

        Some(Self {
            names: config.environments.clone(),
            show_name: config.environment_show_name,
            show_nullable: config.environment_show_nullable,
        })
    }

    fn read(&self) -> Vec<(&str, Option<String>)> {
        self.names
            .iter()
            .map(|name| (name.as_str(), std::env::var(name).ok()))
            .filter(|(_, value)| value.is_some() || self.show_nullable)
            .collect()
    }

    /// `[A=1, B=2] `, or nothing when no value is printed.
    pub(crate) fn render_text(&self, out: &mut String) {
        let values = self.read();
        if values.is_empty() {
            return;
        }

        out.push('[');
        for (i, (name, value)) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if self.show_name {
                out.push_str(name);
                out.push('=');
            }
            out.push_str(value.as_deref().unwrap_or("null"));
        }
        out.push_str("] ");
    }

    /// `"environment":[...]`
    pub(crate) fn render_json(&self, out: &mut String) {
        let values = self.read();
        out.push_str("\"environment\":");
        // SAFETY: names and values are serializable.
        let array = if self.show_name {
            let named = values
                .iter()
                .map(|(name, value)| NamedValue {
                    name,
                    value: value.as_deref(),
                })
                .collect::<Vec<_>>();
            serde_json::to_string(&named).unwrap()
        } else {
            let plain = values
                .iter()
                .map(|(_, value)| value.as_deref())
                .collect::<Vec<_>>();
            serde_json::to_string(&plain).unwrap()
        };
        out.push_str(&array);
    }
}
