use clap::{Parser, Subcommand};

use deskgate::auth::Identity;
use deskgate::codec::token_codec;

#[derive(Parser)]
#[command(name = "deskgate-cli")]
#[command(about = "Inspect and mint deskgate identity tokens", long_about = None)]
struct Cli {
    /// Security key the server masks its cookies with.
    #[arg(short, long, env = "DESKGATE_SECURITY_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a cookie token for an identity
    Encode {
        urn: String,
        /// Extra properties as key=value
        #[arg(short, long = "property")]
        properties: Vec<String>,
    },
    /// Print the identity inside a cookie token
    Decode { token: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let codec = token_codec(&cli.key);

    match cli.command {
        Commands::Encode { urn, properties } => {
            let mut identity = Identity::new(urn);
            for property in properties {
                let (key, value) = property
                    .split_once('=')
                    .ok_or_else(|| format!("property must be key=value: {property}"))?;
                identity = identity.with_property(key, value);
            }
            println!("{}", String::from_utf8(codec.encode(&identity)?)?);
        }
        Commands::Decode { token } => match codec.decode(token.as_bytes()) {
            Some(identity) => {
                println!("urn: {}", identity.urn());
                for (key, value) in identity.properties() {
                    println!("{key}: {value}");
                }
            }
            None => {
                eprintln!("token does not decode with this key");
                std::process::exit(1);
            }
        },
    }
    Ok(())
}
