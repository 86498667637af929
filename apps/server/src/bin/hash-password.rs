//! Prints an argon2 hash for the `[[auth.users]]` allow-list.
//!
//! ```text
//! $ echo -n 'secret' | hash-password
//! $argon2id$v=19$m=19456,t=2,p=1$...
//! ```

use std::io::Read;

use anyhow::{bail, Context};

fn main() -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read password from stdin")?;

    let password = input.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("Empty password; pipe the password on stdin");
    }

    let hash = vape_server::auth::hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    println!("{}", hash);
    Ok(())
}
