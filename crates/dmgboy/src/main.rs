use std::path::PathBuf;

use dmgboy::RunOptions;

const USAGE: &str = "Usage: dmgboy <rom_path> [frames] [out_rgb24_path]";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let rom = args.next().map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("{USAGE}");
        std::process::exit(2);
    });
    let frames = args.next().map(|arg| {
        arg.parse::<u64>().unwrap_or_else(|_| {
            eprintln!("Invalid frames '{arg}'; expected an integer.\n{USAGE}");
            std::process::exit(2);
        })
    });
    let dump = args.next().map(PathBuf::from);
    let frame_pacing = std::env::var_os("DMGBOY_NO_PACING").is_none();

    log::info!("Playing ROM path: '{}'", rom.display());
    dmgboy::run(&RunOptions {
        rom,
        frames,
        dump,
        frame_pacing,
    })
}
