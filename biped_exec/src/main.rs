//! # Biped Executable
//!
//! This executable drives the four servo biped through a routine of gestures:
//! - Builds the servo backend (simulated or a PCA9685 board)
//! - Loads, overrides and saves the calibration trims
//! - Performs the routine and returns home to rest

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the biped executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Result};
use log::{info, warn};
use std::convert::TryInto;

// Internal
use biped_lib::{
    gestures::{biped_joint, BipedCtrl, Gesture, NUM_BIPED_JOINTS},
    servo_ctrl::SimServo,
    store::FileStore,
    sync_ctrl::SyncCtrl,
};
use eqpt_if::eqpt::{servo::Actuator, store::ByteStore};
use params::{BipedExecParams, ServoBackend};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
    time::MonoClock,
};

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

type Servos = [Box<dyn Actuator>; NUM_BIPED_JOINTS];

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "biped_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Load parameters, which set up logging
    let params: BipedExecParams = util::params::load("biped_exec.toml")
        .wrap_err("Failed to load the biped executable parameters")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, params.per_tick_logging, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Biped Executable\n");
    info!("Running on: {}", host::get_host_desc());
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- CONTROLLER INITIALISATION ----

    let servos = build_servos(&params.backend)
        .wrap_err("Failed to initialise the servos")?;

    let mut ctrl: BipedCtrl<Box<dyn Actuator>, MonoClock> = SyncCtrl::new(
        params.sync_ctrl.clone(),
        servos,
        MonoClock::new()
    ).wrap_err("Failed to initialise SyncCtrl")?;

    let mut calib_store = match params.calib.store_file {
        Some(ref rel_path) => {
            let path = host::get_sw_root()
                .wrap_err("The software root is not set")?
                .join(rel_path);
            Some(
                FileStore::open(&path, params.calib.store_capacity)
                    .wrap_err_with(|| format!("Failed to open the calibration store {:?}", path))?
            )
        },
        None => None,
    };

    let load_store = match calib_store {
        Some(ref s) if params.calib.load => Some(s as &dyn ByteStore),
        _ => None,
    };
    ctrl.init(load_store)
        .wrap_err("Failed to initialise the joints")?;

    if let Some(ref trims) = params.calib.trims {
        let trims: [i8; NUM_BIPED_JOINTS] = trims.as_slice().try_into()
            .map_err(|_| eyre!(
                "Expected {} trims but found {}", NUM_BIPED_JOINTS, trims.len()
            ))?;
        ctrl.set_trims(&trims);
        info!("Trims overridden to {:?}", ctrl.trims());
    }

    if params.calib.save {
        match calib_store {
            Some(ref mut s) => ctrl.save_trims(s)
                .wrap_err("Failed to save the trims")?,
            None => warn!("Trim saving requested but no calibration store is configured"),
        }
    }

    if params.archive_demands {
        ctrl.enable_archive(&session)
            .wrap_err("Failed to create the joint demands archive")?;
    }

    info!("Initialisation complete");

    // ---- ROUTINE ----

    let routine = if params.routine.is_empty() {
        info!("No routine given, running the demonstration routine");
        Gesture::demo_routine()
    }
    else {
        params.routine.clone()
    };

    for gesture in routine.iter() {
        if let Err(e) = gesture.perform(&mut ctrl) {
            warn!("Gesture {:?} failed, abandoning the routine: {}", gesture, e);
            break;
        }
    }

    ctrl.home().wrap_err("Failed to return home")?;

    info!("Routine complete: {:#?}", ctrl.report());

    session.exit();

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create the servo of every biped joint for the selected backend.
fn build_servos(backend: &ServoBackend) -> Result<Servos> {
    match backend {
        ServoBackend::Sim => {
            info!("Using simulated servos");
            Ok(std::array::from_fn(|i| {
                Box::new(SimServo::new(biped_joint(i))) as Box<dyn Actuator>
            }))
        },
        ServoBackend::Pca9685 { i2c_address, pwm, channels } => {
            build_pca9685_servos(*i2c_address, pwm, channels)
        }
    }
}

#[cfg(all(target_arch = "arm", target_os = "linux", target_env = "gnu"))]
fn build_pca9685_servos(
    i2c_address: u8,
    pwm: &biped_lib::servo_ctrl::PwmConfig,
    channels: &[params::ChannelMap],
) -> Result<Servos> {
    use biped_lib::servo_ctrl::{pca9685, PwmServo};
    use std::{cell::RefCell, rc::Rc};

    pwm.are_valid().wrap_err("Invalid PWM configuration")?;

    let i2c = rppal::i2c::I2c::new()
        .wrap_err("Failed to open the I2C bus")?;
    let board = Rc::new(RefCell::new(
        pca9685::open_board(i2c, i2c_address, pwm.pwm_freq_hz)
            .wrap_err("Failed to open the PCA9685 board")?
    ));

    let mut servos: Vec<Box<dyn Actuator>> = Vec::with_capacity(NUM_BIPED_JOINTS);
    for i in 0..NUM_BIPED_JOINTS {
        let joint = biped_joint(i)
            .ok_or_else(|| eyre!("No joint in slot {}", i))?;
        let map = channels.iter()
            .find(|c| c.joint == joint)
            .ok_or_else(|| eyre!("No channel mapped for joint {:?}", joint))?;
        let channel = pca9685::channel_from_index(map.channel)
            .ok_or_else(|| eyre!("Invalid PCA9685 channel {}", map.channel))?;

        info!("Joint {:?} on PCA9685 channel {}", joint, map.channel);
        servos.push(Box::new(PwmServo::new(board.clone(), channel, *pwm)));
    }

    servos.try_into()
        .map_err(|_| eyre!("Expected {} servos", NUM_BIPED_JOINTS))
}

#[cfg(not(all(target_arch = "arm", target_os = "linux", target_env = "gnu")))]
fn build_pca9685_servos(
    _i2c_address: u8,
    _pwm: &biped_lib::servo_ctrl::PwmConfig,
    _channels: &[params::ChannelMap],
) -> Result<Servos> {
    Err(eyre!("The PCA9685 backend is only available on the Raspberry Pi"))
}
