use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "availability-cli")]
#[command(about = "Query a running availability proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "AVAILABILITY_PROXY_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy health
    Health,
    /// Ask LibCal about a room by its lid/gid/eid (defaults to the proxy's default room)
    Check {
        #[arg(long, requires_all = ["gid", "eid"])]
        lid: Option<String>,
        #[arg(long, requires_all = ["lid", "eid"])]
        gid: Option<String>,
        #[arg(long, requires_all = ["lid", "gid"])]
        eid: Option<String>,
        /// Referer to present to LibCal
        #[arg(long)]
        referer: Option<String>,
    },
    /// List catalog rooms
    Rooms {
        #[arg(long)]
        building: Option<String>,
        /// Minimum number of seats
        #[arg(long)]
        capacity: Option<u32>,
        /// Required feature; repeat for several
        #[arg(long = "feature")]
        features: Vec<String>,
        /// Only rooms that are open
        #[arg(long)]
        available: bool,
    },
    /// Show one catalog room
    Room { id: String },
    /// Ask LibCal about a catalog room
    RoomAvailability { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let response = match cli.command {
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Check {
            lid,
            gid,
            eid,
            referer,
        } => {
            client
                .post(format!("{base}/api/post"))
                .json(&check_body(lid, gid, eid, referer))
                .send()
                .await?
        }
        Commands::Rooms {
            building,
            capacity,
            features,
            available,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(building) = building {
                query.push(("building", building));
            }
            if let Some(capacity) = capacity {
                query.push(("capacity", capacity.to_string()));
            }
            if !features.is_empty() {
                query.push(("features", features.join(",")));
            }
            if available {
                query.push(("availability", "available".to_string()));
            }
            client
                .get(format!("{base}/api/rooms"))
                .query(&query)
                .send()
                .await?
        }
        Commands::Room { id } => client.get(format!("{base}/api/rooms/{id}")).send().await?,
        Commands::RoomAvailability { id } => {
            client
                .get(format!("{base}/api/rooms/{id}/availability"))
                .send()
                .await?
        }
    };

    print_response(response).await
}

/// JSON body for `/api/post`; the room goes in as a positional payload.
fn check_body(
    lid: Option<String>,
    gid: Option<String>,
    eid: Option<String>,
    referer: Option<String>,
) -> Value {
    let mut body = json!({});
    if let (Some(lid), Some(gid), Some(eid)) = (lid, gid, eid) {
        body["payload"] = json!([lid, gid, eid]);
    }
    if let Some(referer) = referer {
        body["referer"] = json!(referer);
    }
    body
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn check(args: &[&str]) -> Result<Value, clap::Error> {
        let cli = Cli::try_parse_from(["availability-cli", "check"].iter().chain(args))?;
        match cli.command {
            Commands::Check {
                lid,
                gid,
                eid,
                referer,
            } => Ok(check_body(lid, gid, eid, referer)),
            _ => unreachable!("parsed the check subcommand"),
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn room_ids_are_all_or_nothing() {
        assert!(check(&["--gid", "5", "--eid", "6"]).is_err());
        assert!(check(&["--lid", "4"]).is_err());
        assert!(check(&["--eid", "6"]).is_err());

        let body = check(&["--lid", "4", "--gid", "5", "--eid", "6"]).unwrap();
        assert_eq!(body, json!({ "payload": ["4", "5", "6"] }));
    }

    #[test]
    fn bare_check_queries_the_default_room() {
        let body = check(&["--referer", "https://libcal.wesleyan.edu/space/1"]).unwrap();
        assert_eq!(body, json!({ "referer": "https://libcal.wesleyan.edu/space/1" }));
    }
}
