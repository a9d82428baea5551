#![forbid(unsafe_code)]

use std::io;

use lazy_static::lazy_static;
use log::{error, info};
use poem::listener::{Listener, RustlsCertificate, RustlsConfig};
use poem::listener::TcpListener;

// Edition Utilities
use crate::routes::make_app;
use crate::utils::app_state::AppState;
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx,
                           EDITION_ARGS, EDITION_DIRS, TLS_CERT_FILE, TLS_KEY_FILE};
use crate::utils::errors::Errors;

// Modules
mod routes;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "EditionServer"; // for poem logging

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), io::Error> {
    // --------------- Initialize Server --------------
    // Announce ourselves.
    println!("Starting edition_server!");

    // Directory set up only.
    if EDITION_ARGS.create_dirs_only {
        println!("Data directories are ready under {}.", EDITION_DIRS.root_dir);
        return Ok(());
    }

    // Initialize the server.
    let state = edition_init().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    // --------------- Main Loop Set Up ---------------
    // Assign base URL of the versioned api.
    let config = &RUNTIME_CTX.parms.config;
    let api_url = format!("{}:{}{}", config.http_addr, config.http_port, "/v1");

    // Create the routes.
    let addr = format!("{}{}", "0.0.0.0:", config.http_port);
    let app = make_app(state, &api_url);
    info!("{} listening on {} (tls={}).", config.title, addr, config.enable_tls);

    // ------------------ Main Loop -------------------
    if config.enable_tls {
        let key_file = RUNTIME_CTX.edition_dirs.certs_dir.clone() + TLS_KEY_FILE;
        let cert_file = RUNTIME_CTX.edition_dirs.certs_dir.clone() + TLS_CERT_FILE;
        poem::Server::new(
            TcpListener::bind(addr).rustls(
                RustlsConfig::new().fallback(
                    RustlsCertificate::new()
                        .key(std::fs::read(key_file)?)
                        .cert(std::fs::read(cert_file)?),
                ),
            ),
        )
        .name(SERVER_NAME)
        .run(app)
        .await
    } else {
        poem::Server::new(TcpListener::bind(addr))
            .name(SERVER_NAME)
            .run(app)
            .await
    }
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// edition_init:
// ---------------------------------------------------------------------------
/** Initialize all subsystems and build the read-only state shared by the
 * request handlers.
 */
fn edition_init() -> Result<AppState, Errors> {
    // Configure our log.
    init_log();

    // Force the reading of input parameters and initialization of runtime context.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    // Log build info.
    print_version_info();

    // Greeting table and template.
    let state = match AppState::new() {
        Ok(s) => s,
        Err(e) => {
            error!("Unable to initialize the edition server: {}", e);
            return Err(e);
        }
    };
    info!("Greetings available in: {}.", state.greetings.languages().join(", "));
    Ok(state)
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    // Log build info.
    info!("{}.", format!("\n*** Running EDITION_SERVER={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}",
                        option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
                        env!("GIT_BRANCH"),
                        env!("GIT_COMMIT_SHORT"),
                        env!("GIT_DIRTY"),
                        env!("SOURCE_TIMESTAMP"),
                        env!("RUSTC_VERSION")),
    );
}
