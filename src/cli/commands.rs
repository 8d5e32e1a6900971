use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{error, info, warn};
use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::devices::gps::{list_ports, GnssReader, NoPowerControl, PowerControl, SerialTransport, SysfsGpio};
use crate::devices::CombinedFix;
use crate::nmea::{classify, nmea_checksum, split_checksum, verify_checksum};
use crate::output::{formatter_for, ConsoleSender, DataFormatter, DataSender, FileSender};
use crate::utils::error::GnssError;

pub fn build_cli() -> Command {
    Command::new("panthyr-gnss")
        .version(crate::VERSION)
        .about("Collect time, geoposition and height from the GGA and RMC sentences of a GNSS receiver")
        .subcommand_required(true)
        .arg(Arg::new("config").short('c').long("config").global(true).help("TOML configuration file"))
        .arg(Arg::new("port").short('p').long("port").global(true).help("Serial port of the receiver"))
        .arg(Arg::new("baud").short('b').long("baud").global(true).help("Baud rate"))
        .arg(Arg::new("timeout").short('t').long("timeout").global(true).help("Seconds to wait for a GGA/RMC pair"))
        .arg(Arg::new("interval").short('i').long("interval").global(true).help("Seconds between monitor loops"))
        .arg(Arg::new("power-gpio").long("power-gpio").global(true).help("sysfs GPIO line enabling the receiver"))
        .arg(Arg::new("format").short('f').long("format").global(true).help("console, json or csv"))
        .arg(Arg::new("output-file").short('o').long("output-file").global(true).help("Append results to this file"))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .subcommand(Command::new("getfix").about("Single acquisition attempt"))
        .subcommand(Command::new("monitor").about("Acquire fixes in a loop until Ctrl+C"))
        .subcommand(Command::new("listports").about("List available serial ports"))
        .subcommand(
            Command::new("checksum")
                .about("Verify the checksum of an NMEA sentence")
                .arg(Arg::new("sentence").required(true)),
        )
        .subcommand(
            Command::new("saveconfig")
                .about("Write the effective configuration to a TOML file")
                .arg(Arg::new("file").required(true)),
        )
}

fn power_control_for(config: &Config) -> Box<dyn PowerControl> {
    match config.power_gpio {
        Some(line) => Box::new(SysfsGpio::new(line)),
        None => Box::new(NoPowerControl),
    }
}

fn senders_for(config: &Config) -> Vec<Box<dyn DataSender>> {
    let mut senders: Vec<Box<dyn DataSender>> = vec![Box::new(ConsoleSender)];
    if let Some(output_file) = &config.output_file {
        info!("📝 Adding file output: {}", output_file);
        senders.push(Box::new(FileSender::new(output_file)));
    }
    senders
}

async fn send_all(senders: &[Box<dyn DataSender>], data: &str) -> Result<(), GnssError> {
    if data.is_empty() {
        return Ok(());
    }
    for sender in senders {
        if let Err(e) = sender.send(data).await {
            error!("❌ Failed to send to {}: {}", sender.destination(), e);
            return Err(e);
        }
    }
    Ok(())
}

async fn report(
    formatter: &dyn DataFormatter,
    senders: &[Box<dyn DataSender>],
    config: &Config,
    result: &Option<CombinedFix>,
) -> Result<(), GnssError> {
    let text = match result {
        Some(fix) => formatter.format_fix(fix),
        None => formatter.format_no_fix(config.nmea_timeout_seconds),
    };
    send_all(senders, &text).await
}

fn open_reader(config: &Config) -> Result<GnssReader<SerialTransport>, GnssError> {
    let transport = SerialTransport::open(&config.serial_port, config.baud_rate)?;
    Ok(GnssReader::new(transport)
        .with_poll_interval(config.poll_interval())
        .with_max_sentence_length(config.max_sentence_length))
}

/// Runs the selected subcommand. `Ok(false)` means the command ran but did
/// not produce what was asked (no fix, invalid checksum).
pub async fn handle_subcommands(matches: &ArgMatches, config: &Config) -> Result<bool, GnssError> {
    match matches.subcommand() {
        Some(("getfix", _)) => get_fix_once(config).await,
        Some(("monitor", _)) => monitor(config).await.map(|_| true),
        Some(("listports", _)) => {
            let ports = list_ports()?;
            if ports.is_empty() {
                println!("⚠️  No serial ports found");
            }
            for (index, port) in ports.iter().enumerate() {
                println!("{}. {}", index + 1, port.name);
                if let Some(manufacturer) = &port.manufacturer {
                    println!("   Manufacturer: {}", manufacturer);
                }
                if let Some(serial_number) = &port.serial_number {
                    println!("   Serial Number: {}", serial_number);
                }
            }
            Ok(true)
        }
        Some(("checksum", sub)) => {
            let sentence = sub
                .get_one::<String>("sentence")
                .ok_or_else(|| GnssError::ConfigError("missing sentence".to_string()))?;
            Ok(check_sentence(sentence))
        }
        Some(("saveconfig", sub)) => {
            let file = sub
                .get_one::<String>("file")
                .ok_or_else(|| GnssError::ConfigError("missing file".to_string()))?;
            config.save_to_file(file)?;
            println!("✅ Configuration written to {}", file);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Checksum of the same payload `verify_checksum` covers, if the sentence
/// has a `$` and a two digit `*CRC` suffix.
fn computed_checksum(sentence: &str) -> Option<u8> {
    split_checksum(sentence)
        .ok()
        .map(|(payload, _)| nmea_checksum(payload))
}

fn check_sentence(sentence: &str) -> bool {
    let sentence = sentence.trim();
    if let Some(computed) = computed_checksum(sentence) {
        println!("Computed checksum: {:02X}", computed);
    }
    println!("Sentence type: {:?}", classify(sentence));
    match verify_checksum(sentence) {
        Ok(()) => {
            println!("✅ Checksum valid");
            true
        }
        Err(e) => {
            println!("❌ {}", e);
            false
        }
    }
}

async fn acquire_once(config: &Config) -> Result<Option<CombinedFix>, GnssError> {
    let mut reader = open_reader(config)?;
    let result = reader.get_fix(config.nmea_timeout()).await;
    reader.into_transport().close();
    result
}

/// Runs `attempt` with the receiver powered. A failure to power off is
/// logged so it never hides the attempt's own outcome.
async fn powered<T, F>(power: &mut dyn PowerControl, attempt: F) -> Result<T, GnssError>
where
    F: Future<Output = Result<T, GnssError>>,
{
    power.power_on()?;
    let outcome = attempt.await;
    if let Err(e) = power.power_off() {
        error!("❌ Failed to power off receiver: {}", e);
    }
    outcome
}

async fn get_fix_once(config: &Config) -> Result<bool, GnssError> {
    let formatter = formatter_for(config.output_format);
    let senders = senders_for(config);
    let mut power = power_control_for(config);

    let result = powered(power.as_mut(), acquire_once(config)).await?;
    send_all(&senders, &formatter.format_header()).await?;
    report(formatter.as_ref(), &senders, config, &result).await?;
    Ok(result.is_some())
}

async fn monitor(config: &Config) -> Result<(), GnssError> {
    let formatter = formatter_for(config.output_format);
    let senders = senders_for(config);
    let mut power = power_control_for(config);

    info!(
        "🛰️ Monitoring {} at {} baud, loop time {}s, timeout {}s ({} polls). Hit CTRL+C to exit...",
        config.serial_port,
        config.baud_rate,
        config.loop_time_seconds,
        config.nmea_timeout_seconds,
        config.timeout_ticks()
    );

    power.power_on()?;
    let mut reader = match open_reader(config) {
        Ok(reader) => reader,
        Err(e) => {
            if let Err(off) = power.power_off() {
                error!("❌ Failed to power off receiver: {}", off);
            }
            return Err(e);
        }
    };
    send_all(&senders, &formatter.format_header()).await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut counter: u64 = 1;

    let run_result = loop {
        // Discard what queued up while we were sleeping between loops
        if let Err(e) = reader.transport_mut().flush_input() {
            warn!("⚠️ {}", e);
        }

        let attempt = tokio::select! {
            _ = &mut ctrl_c => None,
            result = reader.get_fix(config.nmea_timeout()) => Some(result),
        };

        match attempt {
            None => break Ok(()),
            Some(Ok(result)) => {
                info!("Loop {}, received: {}", counter, if result.is_some() { "fix" } else { "nothing" });
                if let Err(e) = report(formatter.as_ref(), &senders, config, &result).await {
                    error!("❌ Failed to report loop {}: {}", counter, e);
                }
            }
            Some(Err(e)) => break Err(e),
        }

        counter += 1;
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            _ = tokio::time::sleep(config.loop_time().max(Duration::from_millis(1))) => {}
        }
    };

    info!("Stopping monitor at loop {}", counter);
    reader.into_transport().close();
    if let Err(e) = power.power_off() {
        error!("❌ Failed to power off receiver: {}", e);
    }
    run_result
}
