mod authenticator;

use std::sync::Arc;

use passkey_client::{
    AlwaysSupported, CreationOptions, CredentialDescriptorJson, RegistrationClient,
    RegistrationError,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authenticator::SoftwareAuthenticator;

const DEMO_ORIGIN: &str = "https://localhost:3001";

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            "passkey_client=debug,demo_registration=debug,info".into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn demo_options() -> Result<CreationOptions, serde_json::Error> {
    serde_json::from_value(serde_json::json!({
        "challenge": "Zml6eg",
        "rp": { "id": "localhost", "name": "Passkey Demo" },
        "user": { "id": "NTY3OA", "name": "demo@localhost", "displayName": "Demo User" },
        "pubKeyCredParams": [
            { "alg": -7, "type": "public-key" },
            { "alg": -257, "type": "public-key" }
        ],
        "timeout": 60000,
        "authenticatorSelection": {
            "residentKey": "required",
            "requireResidentKey": true,
            "userVerification": "preferred"
        },
        "attestation": "none",
        "extensions": { "credProps": true }
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let origin = std::env::var("ORIGIN").unwrap_or_else(|_| DEMO_ORIGIN.to_string());
    let platform = Arc::new(SoftwareAuthenticator::new(&origin));
    let client = RegistrationClient::new(platform, Arc::new(AlwaysSupported))
        .with_origin(origin.parse()?);

    let mut options = demo_options()?;
    let result = client.start_registration(options.clone()).await?;
    println!("Registered credential:\n{}", serde_json::to_string_pretty(&result)?);

    // Registering again while excluding the new credential trips InvalidStateError
    options.exclude_credentials = Some(vec![CredentialDescriptorJson {
        id: result.raw_id.clone(),
        type_: result.type_.clone(),
        transports: result.response.transports.clone(),
    }]);

    match client.start_registration(options).await {
        Ok(_) => println!("Unexpected: second registration succeeded"),
        Err(RegistrationError::Classified(e)) => {
            println!("Second registration rejected: [{}] {}", e.code, e.message)
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
