extern crate route53ctl;
#[macro_use] extern crate clap;

use clap::{App, ArgMatches};
use route53ctl::address::SystemResolver;
use route53ctl::r53::Route53Provider;
use route53ctl::{load_config, purge, reconcile, Error, PurgeRequest, ReconcileRequest, Route53ctlConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Exit statuses: 1 when the invocation itself is wrong, 2 when the run
// failed against the provider.
const EXIT_USAGE: i32 = 1;
const EXIT_RUNTIME: i32 = 2;

// Main - Use Clap to build CLI, set up logging, hand off to the library
fn main() {
    let yaml = load_yaml!("cli.yml");
    let matches = App::from_yaml(yaml).version(crate_version!()).get_matches();

    // RUST_LOG wins over --log-level
    let level = matches.value_of("log-level").unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).init();

    info!("route53ctl version {}", crate_version!());

    if let Err(e) = run(&matches) {
        error!("{}", e);
        let code = if e.is_usage() { EXIT_USAGE } else { EXIT_RUNTIME };
        std::process::exit(code);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    // No config file means defaults all around
    let config = match matches.value_of("config") {
        Some(fname) => load_config(fname)?,
        None => Route53ctlConfig::default(),
    };

    let dry = !matches.is_present("no-dry");
    let zone_name = matches.value_of("zone").unwrap_or("").to_string();
    let zone_id = matches.value_of("zone-id").unwrap_or("").to_string();

    let provider = Route53Provider::new(&config.provider)?;

    if matches.is_present("purge") {
        let req = PurgeRequest { dry_run: dry, zone_name, zone_id };
        let report = purge(&provider, &req)?;
        info!(dry, zone_id = %report.zone.id, deletes = report.batch.len(),
              batches = report.change_ids.len(),
              zone_deleted = report.zone_deleted, "purgeZone: done");
        return Ok(());
    }

    let rules: Vec<String> = match matches.values_of("rule") {
        Some(x) => x.map(String::from).collect(),
        None => Vec::new()
    };
    let req = ReconcileRequest {
        dry_run: dry,
        zone_name,
        zone_id,
        vpc_id: matches.value_of("vpc").unwrap_or("").to_string(),
        vpc_region: matches.value_of("region").unwrap_or("").to_string(),
        rules,
        ttl: value_t!(matches, "ttl", i64).unwrap_or_else(|e| e.exit()),
        negative_ttl: value_t!(matches, "nttl", i64).unwrap_or_else(|e| e.exit()),
        negative_cache: config.negative_cache,
    };
    let report = reconcile(&provider, &SystemResolver, &config.vpce_table(), &req)?;
    info!(dry, zone_id = %report.zone.id, created_zone = report.created_zone,
          changes = report.batch.len(), change_id = ?report.change_id, "setZone: done");
    Ok(())
}
