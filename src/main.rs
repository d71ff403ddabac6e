use futures::stream;
use sensorlink::{forward_interrupts, BluetoothCentral, Error, Monitor, MonitorConfig, Outcome};
use stream_cancel::Tripwire;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    let (trigger, tripwire) = Tripwire::new();

    let interrupts = stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(((), ())),
            Err(e) => {
                log::error!("Could not listen for the interrupt signal: {}", e);
                None
            }
        }
    });

    tokio::spawn(async move {
        // A teardown stuck on the radio must not make the process unkillable.
        if forward_interrupts(interrupts, trigger).await {
            log::warn!("Second interrupt, exiting without teardown");
            std::process::exit(130);
        }
    });

    let central = BluetoothCentral::new(0).await?;
    let mut monitor = Monitor::new(central, MonitorConfig::default(), std::io::stdout());

    match monitor.run(tripwire).await? {
        Outcome::Finished { readings, .. } => log::info!("Printed {} readings", readings),
        outcome => log::info!("Run ended: {:?}", outcome),
    }

    Ok(())
}
