//! Spawn a shell on a fresh pty, resize it and print what it reports.
//!
//! Run with:
//! `cargo run --package otty-curses --example resize_shell`

#[cfg(unix)]
use otty_curses::{CursesError, allocate_pty, capabilities};
use std::error::Error;
#[cfg(unix)]
use std::fs::File;
#[cfg(unix)]
use std::io::{ErrorKind, Read, Write};
#[cfg(unix)]
use std::process::Command;
#[cfg(unix)]
use std::thread;
#[cfg(unix)]
use std::time::Duration;

#[cfg(not(unix))]
fn main() -> Result<(), Box<dyn Error>> {
    eprintln!("resize_shell example is only available on Unix platforms.");
    Ok(())
}

#[cfg(unix)]
fn drain(master: &mut File) -> Result<(), Box<dyn Error>> {
    let mut buffer = [0u8; 4096];

    for _ in 0..20 {
        match master.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => print!("{}", String::from_utf8_lossy(&buffer[..read])),
            Err(err) if err.kind() == ErrorKind::WouldBlock => {},
            Err(err) if err.raw_os_error() == Some(nix::libc::EIO) => break,
            Err(err) => return Err(err.into()),
        }

        thread::sleep(Duration::from_millis(50));
    }

    Ok(())
}

#[cfg(unix)]
fn main() -> Result<(), Box<dyn Error>> {
    println!("{}", capabilities().to_json()?);

    let mut pair = match allocate_pty(24, 80) {
        Ok(pair) => pair,
        Err(CursesError::Allocate(errno)) => {
            eprintln!("pty allocation failed: {errno}");
            return Ok(());
        },
        Err(err) => return Err(err.into()),
    };
    pair.set_master_nonblocking()?;

    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-i");
    let mut child = pair.spawn(cmd)?;

    let mut master = File::from(pair.master().try_clone_to_owned()?);
    master.write_all(b"stty size\n")?;
    drain(&mut master)?;

    pair.resize(40, 120)?;
    master.write_all(b"stty size\nexit\n")?;
    drain(&mut master)?;

    let status = child.wait()?;
    println!("\nShell terminated with {status}");

    Ok(())
}
