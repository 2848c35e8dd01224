use anyhow::Result;

use rail_concession::stations;

pub struct StationsCommand {
    query: Option<String>,
}

impl StationsCommand {
    pub fn new(query: Option<String>) -> Self {
        Self { query }
    }

    pub fn print(&self) -> Result<()> {
        let matches = match self.query.as_deref() {
            Some(query) => stations::search(query),
            None => stations::all().iter().collect(),
        };

        if matches.is_empty() {
            println!("🔍 No stations match '{}'", self.query.as_deref().unwrap_or(""));
            return Ok(());
        }

        println!("🚉 {} stations", matches.len());
        for station in matches {
            println!(
                "  {:<6} {:<38} {:<10} {}",
                station.code, station.name, station.city, station.line
            );
        }
        Ok(())
    }
}
