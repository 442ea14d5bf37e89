//! JSON documents printed by each subcommand

use anyhow::Context;
use kot_core::{account_path, address_path, seed_from_mnemonic, Address, NetworkContext};
use kot_params::{HeaderTable, KeyKind, NetworkKind, NetworkProfile, XKeyScheme};
use serde_json::{json, Map, Value};

fn headers_json(table: &HeaderTable) -> Value {
    let map: Map<String, Value> = table
        .entries()
        .map(|(scheme, version)| (scheme.to_string(), json!(format!("{version:#010x}"))))
        .collect();
    Value::Object(map)
}

/// Every registered network
pub fn networks(active: NetworkKind) -> Value {
    let networks: Vec<Value> = kot_params::register_all()
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "active": p.kind == active,
                "is_test_network": p.is_test_network,
                "wif_prefix": p.wif_prefix,
                "p2pkh_version": p.p2pkh_version,
                "p2sh_version": p.p2sh_version,
                "segwit_hrp": p.segwit_hrp,
                "bip44_coin_type": p.bip44_coin_type,
            })
        })
        .collect();
    json!({ "networks": networks })
}

/// Full profile
pub fn info(profile: &NetworkProfile) -> Value {
    let consensus = &profile.consensus;
    json!({
        "name": profile.name,
        "is_test_network": profile.is_test_network,
        "wif_prefix": profile.wif_prefix,
        "p2pkh_version": profile.p2pkh_version,
        "p2sh_version": profile.p2sh_version,
        "segwit_hrp": profile.segwit_hrp,
        "bolt11_hrp": profile.bolt11_hrp,
        "genesis": profile.genesis_hash_hex,
        "bip44_coin_type": profile.bip44_coin_type,
        "default_ports": profile.default_ports,
        "default_servers": profile.default_servers,
        "max_checkpoint": profile.max_checkpoint(),
        "xprv_headers": headers_json(&profile.xprv_headers),
        "xpub_headers": headers_json(&profile.xpub_headers),
        "lightning": {
            "realm_byte": profile.lightning_realm_byte,
            "dns_seeds": profile.lightning_dns_seeds,
            "first_channel_height": profile.block_height_first_lightning_channels,
        },
        "consensus": {
            "pow_limit": consensus.pow_limit.to_hex(),
            "pow_limit_compact": format!("{:#010x}", consensus.pow_limit.to_compact()),
            "pos_limit": consensus.pos_limit.to_hex(),
            "pos_limit_v2": consensus.pos_limit_v2.to_hex(),
            "last_pow_block": consensus.last_pow_block,
            "first_posv1rf_block": consensus.first_posv1rf_block,
            "first_posv2_block": consensus.first_posv2_block,
            "first_posv3_block": consensus.first_posv3_block,
            "posv3_1_activation": consensus.posv3_1_activation().map(|t| t.to_rfc3339()),
            "coinbase_maturity": consensus.coinbase_maturity,
        },
    })
}

/// Genesis hash in both byte orders
pub fn genesis(profile: &NetworkProfile) -> anyhow::Result<Value> {
    let bytes = profile.genesis_bytes()?;
    Ok(json!({
        "network": profile.name,
        "display": profile.genesis_hash_hex,
        "internal": hex::encode(bytes),
    }))
}

/// Latest verified checkpoint, optionally capped at a height
pub fn checkpoint(profile: &NetworkProfile, height: Option<u32>) -> anyhow::Result<Value> {
    let checkpoint = match height {
        Some(height) => Some(profile.checkpoints.checkpoint_at_height(height)?),
        None => profile.checkpoints.verified().last(),
    };
    Ok(json!({
        "network": profile.name,
        "max_checkpoint": profile.max_checkpoint(),
        "checkpoint": checkpoint,
    }))
}

/// Version header of a scheme
pub fn header(ctx: &NetworkContext, scheme: &str, private: bool) -> anyhow::Result<Value> {
    let kind = if private { KeyKind::Private } else { KeyKind::Public };
    let version = ctx.xkey_header(kind, scheme)?;
    Ok(json!({
        "network": ctx.profile().name,
        "scheme": scheme,
        "kind": kind.to_string(),
        "version": format!("{version:#010x}"),
    }))
}

/// Decoded extended key; secrets are never printed
pub fn inspect_key(ctx: &NetworkContext, key: &str) -> anyhow::Result<Value> {
    let key = ctx
        .decode_xkey(key)
        .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;
    let public = key.neuter()?;
    Ok(json!({
        "network": ctx.profile().name,
        "kind": key.kind.to_string(),
        "scheme": key.scheme.to_string(),
        "depth": key.depth,
        "parent_fingerprint": hex::encode(key.parent_fingerprint),
        "child_number": key.child_number,
        "fingerprint": hex::encode(key.fingerprint()?),
        "public_key": hex::encode(key.public_key_bytes()?),
        "xpub": ctx.encode_xkey(&public),
    }))
}

/// Account key and its first addresses
pub fn derive(
    ctx: &NetworkContext,
    mnemonic: &str,
    passphrase: &str,
    scheme: &str,
    account: u32,
    count: u32,
    change: bool,
) -> anyhow::Result<Value> {
    let scheme: XKeyScheme = scheme.parse()?;
    let seed = seed_from_mnemonic(mnemonic, passphrase).context("Invalid mnemonic")?;
    let path = account_path(ctx.profile(), scheme, account)?;
    let xpub = ctx.account_xpub(&seed[..], scheme, account)?;

    let addresses = if scheme.is_multisig() {
        Vec::new()
    } else {
        (0..count)
            .map(|index| -> anyhow::Result<Value> {
                Ok(json!({
                    "path": path.join(&address_path(change, index)?).to_string(),
                    "address": ctx.derive_address(&xpub, change, index)?,
                }))
            })
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    Ok(json!({
        "network": ctx.profile().name,
        "scheme": scheme.to_string(),
        "account_path": path.to_string(),
        "xpub": ctx.encode_xkey(&xpub),
        "addresses": addresses,
    }))
}

/// Validity of an address on the selected network
pub fn validate_address(ctx: &NetworkContext, address: &str) -> Value {
    match ctx.parse_address(address) {
        Ok(parsed) => json!({
            "network": ctx.profile().name,
            "address": address,
            "valid": true,
            "type": address_type(&parsed),
            "script_pubkey": parsed.script_pubkey().ok().map(hex::encode),
        }),
        Err(e) => json!({
            "network": ctx.profile().name,
            "address": address,
            "valid": false,
            "wrong_network": e.is_foreign_network(),
            "error": e.to_string(),
        }),
    }
}

fn address_type(address: &Address) -> String {
    match address {
        Address::P2pkh(_) => "p2pkh".to_string(),
        Address::P2sh(_) => "p2sh".to_string(),
        Address::Segwit { version: 0, program } if program.len() == 20 => "p2wpkh".to_string(),
        Address::Segwit { version: 0, .. } => "p2wsh".to_string(),
        Address::Segwit { version, .. } => format!("witness-v{version}"),
    }
}
