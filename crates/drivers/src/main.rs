mod config;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use config::{parse_point, AppConfig};
use livi_media_adapters::{
    present_capture, present_draft, present_location, present_submit, ExifGeotagWriter,
    FixedGeolocation, FolderCamera, FsSubmissionOutbox, ImageJpegEncoder,
    InMemoryPreviewRegistry, MapboxGeocodingClient, SqliteDraftRepository, SystemClock,
};
use livi_media_application::{
    ApplicationService, BootstrapDraftCommand, CameraArbiter, CancelDraftCommand,
    CaptureDevices, CaptureIntoSlotCommand, DraftView, LocationLookup, LookupAddressCommand,
    MoveSlotCommand, RemoveSlotCommand, ReorderSlotsCommand, ReverseLookupCommand,
    SetPropertyLocationCommand, ShowSlotsQuery, StartDraftCommand,
    SubmitDraftCommand,
};
use livi_media_domain::{FacingMode, GeoPoint};
use tracing::debug;

fn main() -> ExitCode {
    logging::init_logging();
    let args: Vec<String> = std::env::args().collect();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("invalid configuration: {error}");
            return ExitCode::from(2);
        }
    };
    debug!(
        draft = %config.draft_path,
        camera = %config.camera_dir,
        geocoding = %config.mapbox_base_url,
        "configuration loaded"
    );

    let service = match build_application_service(&config) {
        Ok(service) => service,
        Err(error) => {
            eprintln!("failed to start livi-media: {error}");
            return ExitCode::from(1);
        }
    };
    if let Err(error) = service.bootstrap_draft(BootstrapDraftCommand) {
        eprintln!("failed to bootstrap livi-media: {error}");
        return ExitCode::from(1);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to start async runtime: {error}");
            return ExitCode::from(1);
        }
    };

    let command = parse_command(&args);
    match runtime.block_on(run_command(command, &service)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            print_usage();
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_application_service(config: &AppConfig) -> Result<ApplicationService, String> {
    let clock = Arc::new(SystemClock);
    let devices = CaptureDevices {
        camera: Arc::new(FolderCamera::new(config.camera_dir.clone())),
        arbiter: Arc::new(CameraArbiter::new()),
        geolocation: Arc::new(FixedGeolocation::new(config.device_location)),
        encoder: Arc::new(ImageJpegEncoder),
        geotagger: Arc::new(ExifGeotagWriter),
        previews: Arc::new(InMemoryPreviewRegistry::new()),
        clock: clock.clone(),
    };
    let geocoder = MapboxGeocodingClient::new(
        config.mapbox_base_url.clone(),
        config.mapbox_access_token.clone(),
    )
    .map_err(|error| error.to_string())?;

    Ok(ApplicationService::new(
        Box::new(SqliteDraftRepository::new(
            config.draft_path.clone(),
            config.image_dir(),
            clock,
        )),
        Box::new(FsSubmissionOutbox),
        devices,
        LocationLookup::new(Arc::new(geocoder)),
    ))
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Start { existing_remote: Vec<String> },
    Location { location: GeoPoint },
    Locate { query: String, apply: bool },
    Reverse { location: GeoPoint },
    Capture { slot: Option<usize>, facing_mode: FacingMode },
    Remove { slot: usize },
    Reorder { order: Vec<usize> },
    Move { from: usize, to: usize },
    Show { json: bool },
    Submit { outbox_dir: String },
    Cancel,
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn parse_slot(value: &str) -> Result<usize, CommandError> {
    value
        .parse::<usize>()
        .map_err(|_| CommandError::Usage(format!("invalid slot: {value}")))
}

fn parse_location(args: &[String]) -> Result<GeoPoint, CommandError> {
    if args.len() < 4 {
        return Err(CommandError::Usage(
            "missing latitude and longitude".to_string(),
        ));
    }
    parse_point(&args[2], &args[3]).map_err(CommandError::Usage)
}

fn parse_command(args: &[String]) -> Result<Command, CommandError> {
    if args.len() <= 1 {
        return Ok(Command::Show { json: false });
    }

    let rest = &args[2..];
    match args[1].as_str() {
        "start" => Ok(Command::Start {
            existing_remote: rest.to_vec(),
        }),
        "location" => Ok(Command::Location {
            location: parse_location(args)?,
        }),
        "locate" => {
            let apply = rest.iter().any(|arg| arg == "--set");
            let query = rest
                .iter()
                .filter(|arg| arg.as_str() != "--set")
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            if query.trim().is_empty() {
                return Err(CommandError::Usage("missing address query".to_string()));
            }
            Ok(Command::Locate { query, apply })
        }
        "reverse" => Ok(Command::Reverse {
            location: parse_location(args)?,
        }),
        "capture" => {
            let mut slot = None;
            let mut facing_mode = FacingMode::default();
            for arg in rest {
                match arg.as_str() {
                    "--user" => facing_mode = FacingMode::User,
                    other if slot.is_none() => slot = Some(parse_slot(other)?),
                    other => {
                        return Err(CommandError::Usage(format!(
                            "unexpected capture argument: {other}"
                        )))
                    }
                }
            }
            Ok(Command::Capture { slot, facing_mode })
        }
        "remove" => {
            let slot = rest
                .first()
                .ok_or_else(|| CommandError::Usage("missing slot".to_string()))?;
            Ok(Command::Remove {
                slot: parse_slot(slot)?,
            })
        }
        "reorder" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("missing slot order".to_string()));
            }
            let order = rest
                .iter()
                .map(|value| parse_slot(value))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Reorder { order })
        }
        "move" => {
            if rest.len() < 2 {
                return Err(CommandError::Usage(
                    "missing source and target slots".to_string(),
                ));
            }
            Ok(Command::Move {
                from: parse_slot(&rest[0])?,
                to: parse_slot(&rest[1])?,
            })
        }
        "show" => Ok(Command::Show {
            json: rest.iter().any(|arg| arg == "--json"),
        }),
        "submit" => {
            let outbox_dir = rest
                .first()
                .ok_or_else(|| CommandError::Usage("missing outbox directory".to_string()))?;
            Ok(Command::Submit {
                outbox_dir: outbox_dir.clone(),
            })
        }
        "cancel" => Ok(Command::Cancel),
        other => Err(CommandError::Usage(format!("unknown command: {other}"))),
    }
}

async fn run_command(
    command: Result<Command, CommandError>,
    service: &ApplicationService,
) -> Result<(), CommandError> {
    match command? {
        Command::Start { existing_remote } => {
            let view = service
                .start_draft(StartDraftCommand { existing_remote })
                .map_err(|error| CommandError::Runtime(format!("start failed: {error}")))?;
            print_draft(&view);
            Ok(())
        }
        Command::Location { location } => {
            let view = service
                .set_property_location(SetPropertyLocationCommand { location })
                .map_err(|error| CommandError::Runtime(format!("location failed: {error}")))?;
            print_draft(&view);
            Ok(())
        }
        Command::Locate { query, apply } => {
            let matches = service
                .lookup_address(LookupAddressCommand { query, apply })
                .await
                .map_err(|error| CommandError::Runtime(format!("locate failed: {error}")))?;
            if matches.is_empty() {
                println!("no matching addresses");
            }
            for location in &matches {
                println!("{}", present_location(location));
            }
            Ok(())
        }
        Command::Reverse { location } => {
            let resolved = service
                .reverse_lookup(ReverseLookupCommand { location })
                .await
                .map_err(|error| CommandError::Runtime(format!("reverse failed: {error}")))?;
            match resolved {
                Some(location) => println!("{}", present_location(&location)),
                None => println!("no address at that location"),
            }
            Ok(())
        }
        Command::Capture { slot, facing_mode } => {
            let report = service
                .capture_into_slot(CaptureIntoSlotCommand { slot, facing_mode })
                .await
                .map_err(|error| CommandError::Runtime(format!("capture failed: {error}")))?;
            println!("{}", present_capture(&report));
            Ok(())
        }
        Command::Remove { slot } => {
            let view = service
                .remove_slot(RemoveSlotCommand { slot })
                .map_err(|error| CommandError::Runtime(format!("remove failed: {error}")))?;
            print_draft(&view);
            Ok(())
        }
        Command::Reorder { order } => {
            let view = service
                .reorder_slots(ReorderSlotsCommand { order })
                .map_err(|error| CommandError::Runtime(format!("reorder failed: {error}")))?;
            print_draft(&view);
            Ok(())
        }
        Command::Move { from, to } => {
            let view = service
                .move_slot(MoveSlotCommand { from, to })
                .map_err(|error| CommandError::Runtime(format!("move failed: {error}")))?;
            print_draft(&view);
            Ok(())
        }
        Command::Show { json } => {
            let view = service
                .show_slots(ShowSlotsQuery)
                .map_err(|error| CommandError::Runtime(format!("show failed: {error}")))?;
            if json {
                let body = serde_json::to_string_pretty(&view)
                    .map_err(|error| CommandError::Runtime(format!("show failed: {error}")))?;
                println!("{body}");
            } else {
                print_draft(&view);
            }
            Ok(())
        }
        Command::Submit { outbox_dir } => {
            let report = service
                .submit_draft(SubmitDraftCommand { outbox_dir })
                .map_err(|error| CommandError::Runtime(format!("submit failed: {error}")))?;
            for line in present_submit(&report) {
                println!("{line}");
            }
            Ok(())
        }
        Command::Cancel => {
            service
                .cancel_draft(CancelDraftCommand)
                .map_err(|error| CommandError::Runtime(format!("cancel failed: {error}")))?;
            println!("draft discarded");
            Ok(())
        }
    }
}

fn print_draft(view: &DraftView) {
    for line in present_draft(view) {
        println!("{line}");
    }
}

fn print_usage() {
    println!("usage:");
    println!("  livi-media start [remote_image_url...]");
    println!("  livi-media location <lat> <lon>");
    println!("  livi-media locate <address query> [--set]");
    println!("  livi-media reverse <lat> <lon>");
    println!("  livi-media capture [slot] [--user]");
    println!("  livi-media remove <slot>");
    println!("  livi-media reorder <slot...>");
    println!("  livi-media move <from> <to>");
    println!("  livi-media show [--json]");
    println!("  livi-media submit <outbox_dir>");
    println!("  livi-media cancel");
}
