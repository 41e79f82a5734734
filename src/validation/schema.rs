//! Structure of a CoreOS cloud-config document.
//!
//! Every key the cloud-config format understands is declared here with its expected kind,
//! an optional pattern its value must match, and an optional deprecation note. The
//! validator walks a parsed document against [`ROOT`].

use std::fmt;

/// Expected kind of a value.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    /// Any scalar, rendered as a string
    String,
    /// `true` / `false`
    Bool,
    /// Whole number
    Int,
    /// Any number
    Float,
    /// Sequence of the inner kind
    List(&'static Kind),
    /// Mapping with known fields
    Struct(&'static [Field]),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::List(inner) => write!(f, "list of {inner}"),
            Self::Struct(_) => f.write_str("map"),
        }
    }
}

/// A known key.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Key as written in the document (underscore form)
    pub name: &'static str,
    /// Expected kind
    pub kind: Kind,
    /// Regex the scalar value must match
    pub valid: Option<&'static str>,
    /// Why the key should no longer be used
    pub deprecated: Option<&'static str>,
}

impl Field {
    const fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            valid: None,
            deprecated: None,
        }
    }

    const fn valid(self, pattern: &'static str) -> Self {
        Self {
            valid: Some(pattern),
            ..self
        }
    }

    const fn deprecated(self, reason: &'static str) -> Self {
        Self {
            deprecated: Some(reason),
            ..self
        }
    }

    /// Find a field by name in a field list.
    #[must_use]
    pub fn lookup(fields: &'static [Field], name: &str) -> Option<&'static Field> {
        fields.iter().find(|f| f.name == name)
    }
}

const fn string(name: &'static str) -> Field {
    Field::new(name, Kind::String)
}

const fn boolean(name: &'static str) -> Field {
    Field::new(name, Kind::Bool)
}

const fn int(name: &'static str) -> Field {
    Field::new(name, Kind::Int)
}

const fn float(name: &'static str) -> Field {
    Field::new(name, Kind::Float)
}

const STRING_LIST: Kind = Kind::List(&Kind::String);

const IMPORT_DEPRECATION: &str =
    "trying to fetch from a remote endpoint introduces too many intermittent errors";

/// Top-level keys.
pub const ROOT: &[Field] = &[
    Field::new("coreos", Kind::Struct(COREOS)),
    Field::new("ssh_authorized_keys", STRING_LIST),
    string("hostname"),
    Field::new("users", Kind::List(&Kind::Struct(USER))),
    Field::new("write_files", Kind::List(&Kind::Struct(FILE))),
    string("manage_etc_hosts").valid("^localhost$"),
];

/// Keys under `coreos`.
pub const COREOS: &[Field] = &[
    Field::new("etcd", Kind::Struct(ETCD)),
    Field::new("etcd2", Kind::Struct(ETCD2)),
    Field::new("flannel", Kind::Struct(FLANNEL)),
    Field::new("fleet", Kind::Struct(FLEET)),
    Field::new("locksmith", Kind::Struct(LOCKSMITH)),
    Field::new("oem", Kind::Struct(OEM)),
    Field::new("update", Kind::Struct(UPDATE)),
    Field::new("units", Kind::List(&Kind::Struct(UNIT))),
];

const ETCD: &[Field] = &[
    string("addr"),
    string("bind_addr"),
    string("ca_file"),
    string("cert_file"),
    int("cluster_active_size"),
    float("cluster_remove_delay"),
    float("cluster_sync_interval"),
    string("cors"),
    string("data_dir"),
    string("discovery"),
    float("http_read_timeout"),
    float("http_write_timeout"),
    string("key_file"),
    int("max_result_buffer"),
    int("max_retry_attempts"),
    string("name"),
    string("peer_addr"),
    string("peer_bind_addr"),
    string("peer_ca_file"),
    string("peer_cert_file"),
    int("peer_election_timeout"),
    int("peer_heartbeat_interval"),
    string("peer_key_file"),
    string("peers"),
    string("peers_file"),
    float("retry_interval"),
    boolean("snapshot"),
    int("snapshot_count"),
    string("strtrace"),
    boolean("verbose"),
    boolean("very_verbose"),
];

const ETCD2: &[Field] = &[
    string("advertise_client_urls"),
    string("ca_file"),
    string("cert_file"),
    boolean("client_cert_auth"),
    string("cors"),
    string("data_dir"),
    boolean("debug"),
    string("discovery"),
    string("discovery_fallback").valid("^(exit|proxy)$"),
    string("discovery_proxy"),
    string("discovery_srv"),
    int("election_timeout"),
    boolean("enable_pprof"),
    boolean("force_new_cluster"),
    int("heartbeat_interval"),
    string("initial_advertise_peer_urls"),
    string("initial_cluster"),
    string("initial_cluster_state").valid("^(new|existing)$"),
    string("initial_cluster_token"),
    string("key_file"),
    string("listen_client_urls"),
    string("listen_peer_urls"),
    string("log_package_levels"),
    int("max_snapshots"),
    int("max_wals"),
    string("name"),
    string("peer_ca_file"),
    string("peer_cert_file"),
    boolean("peer_client_cert_auth"),
    string("peer_key_file"),
    string("peer_trusted_ca_file"),
    string("proxy").valid("^(on|off|readonly)$"),
    int("proxy_dial_timeout"),
    int("proxy_failure_wait"),
    int("proxy_read_timeout"),
    int("proxy_refresh_interval"),
    int("proxy_write_timeout"),
    int("snapshot_count"),
    string("trusted_ca_file"),
    string("wal_dir"),
];

const FLANNEL: &[Field] = &[
    string("etcd_cafile"),
    string("etcd_certfile"),
    string("etcd_endpoints"),
    string("etcd_keyfile"),
    string("etcd_password"),
    string("etcd_prefix"),
    string("etcd_username"),
    string("interface"),
    string("ip_masq"),
    string("public_ip"),
    string("subnet_file"),
];

const FLEET: &[Field] = &[
    string("agent_ttl"),
    string("authorized_keys_file"),
    boolean("disable_engine"),
    float("engine_reconcile_interval"),
    string("etcd_cafile"),
    string("etcd_certfile"),
    string("etcd_key_prefix"),
    string("etcd_keyfile"),
    float("etcd_request_timeout"),
    string("etcd_servers"),
    string("metadata"),
    string("public_ip"),
    int("token_limit"),
    int("verbosity"),
    boolean("verify_units"),
];

const LOCKSMITH: &[Field] = &[
    string("endpoint"),
    string("etcd_cafile"),
    string("etcd_certfile"),
    string("etcd_keyfile"),
    string("group"),
    string("window_start").valid(
        r"^((?i:sun|mon|tue|wed|thu|fri|sat|sun) )?0*([0-9]|1[0-9]|2[0-3]):0*([0-9]|[1-5][0-9])$",
    ),
    string("window_length").valid(r"^[-+]?([0-9]*(\.[0-9]*)?[a-z]+)+$"),
];

const OEM: &[Field] = &[
    string("bug_report_url"),
    string("home_url"),
    string("id"),
    string("name"),
    string("version_id"),
];

const UPDATE: &[Field] = &[
    string("group"),
    string("reboot_strategy").valid("^(best-effort|etcd-lock|reboot|off)$"),
    string("server"),
];

const UNIT: &[Field] = &[
    string("command")
        .valid("^(start|stop|restart|reload|try-restart|reload-or-restart|reload-or-try-restart)$"),
    string("content"),
    Field::new("drop_ins", Kind::List(&Kind::Struct(DROP_IN))),
    boolean("enable"),
    boolean("mask"),
    string("name"),
    boolean("runtime"),
];

const DROP_IN: &[Field] = &[string("content"), string("name")];

const USER: &[Field] = &[
    string("coreos_ssh_import_github").deprecated(IMPORT_DEPRECATION),
    Field::new("coreos_ssh_import_github_users", STRING_LIST).deprecated(IMPORT_DEPRECATION),
    string("coreos_ssh_import_url").deprecated(IMPORT_DEPRECATION),
    string("gecos"),
    Field::new("groups", STRING_LIST),
    string("homedir"),
    string("name"),
    boolean("no_create_home"),
    boolean("no_log_init"),
    boolean("no_user_group"),
    string("passwd"),
    string("primary_group"),
    string("shell"),
    Field::new("ssh_authorized_keys", STRING_LIST),
    boolean("system"),
];

/// Keys of a `write_files` entry.
pub const FILE: &[Field] = &[
    string("content"),
    string("encoding")
        .valid(r"^(base64|b64|gz|gzip|gz\+base64|gzip\+base64|gz\+b64|gzip\+b64)$"),
    string("owner"),
    string("path"),
    string("permissions").valid("^0?[0-7]{3,4}$"),
];
