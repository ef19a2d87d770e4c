use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lifxlan_frame::Target;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result that can be rendered in every output format.
pub trait Record: Serialize {
    /// Column titles for table output.
    fn headers() -> &'static [&'static str];

    /// Cell values in header order.
    fn cells(&self) -> Vec<String>;
}

/// Print `records` to stdout. JSON output is one object per line.
pub fn print_records<R: Record>(records: &[R], format: OutputFormat) {
    print!("{}", render_records(records, format));
}

pub fn render_records<R: Record>(records: &[R], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => records
            .iter()
            .map(|record| {
                let line = serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string());
                format!("{line}\n")
            })
            .collect(),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(R::headers().to_vec());
            for record in records {
                table.add_row(record.cells());
            }
            format!("{table}\n")
        }
        OutputFormat::Pretty => records
            .iter()
            .map(|record| {
                let pairs: Vec<String> = R::headers()
                    .iter()
                    .zip(record.cells())
                    .map(|(key, value)| format!("{}={value}", key.to_lowercase()))
                    .collect();
                format!("{}\n", pairs.join(" "))
            })
            .collect(),
    }
}

/// Render the six address bytes of a target as a MAC address.
pub fn format_target(target: &Target) -> String {
    target[..6]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        port: u32,
    }

    impl Record for Row {
        fn headers() -> &'static [&'static str] {
            &["NAME", "PORT"]
        }

        fn cells(&self) -> Vec<String> {
            vec![self.name.to_string(), self.port.to_string()]
        }
    }

    #[test]
    fn json_is_one_object_per_line() {
        let rows = [Row { name: "a", port: 1 }, Row { name: "b", port: 2 }];
        let out = render_records(&rows, OutputFormat::Json);
        assert_eq!(out, "{\"name\":\"a\",\"port\":1}\n{\"name\":\"b\",\"port\":2}\n");
    }

    #[test]
    fn pretty_is_key_value_pairs() {
        let rows = [Row { name: "bulb", port: 56700 }];
        assert_eq!(
            render_records(&rows, OutputFormat::Pretty),
            "name=bulb port=56700\n"
        );
    }

    #[test]
    fn table_has_headers() {
        let rows = [Row { name: "bulb", port: 56700 }];
        let out = render_records(&rows, OutputFormat::Table);
        assert!(out.contains("NAME"));
        assert!(out.contains("56700"));
    }

    #[test]
    fn target_renders_as_mac() {
        let target = [0xD0, 0x73, 0xD5, 0x01, 0x02, 0x0A, 0, 0];
        assert_eq!(format_target(&target), "d0:73:d5:01:02:0a");
    }
}
