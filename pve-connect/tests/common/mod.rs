//! Shared fixtures for pve-connect integration tests.
//!
//! Fake `qm` and `pct` shell scripts stand in for the Proxmox tools:
//! - VM 100: guest agent answers with 10.0.0.5
//! - VM 102: no guest agent, `serial0` configured
//! - VM 104: no guest agent, no serial console
//! - CT 101: running container
//! - `fail/qm`, `fail/pct`: exit 1 with a stderr message

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::OnceLock;

use tempfile::TempDir;

const FAKE_QM: &str = r#"#!/bin/sh
case "$1" in
  list)
    echo "      VMID NAME                 STATUS     MEM(MB)    BOOTDISK(GB) PID"
    echo "       100 web                  running    2048              32.00 1234"
    echo "       102 legacy               stopped    1024              16.00 0"
    echo "       104 appliance            running    512                8.00 5678"
    ;;
  agent)
    if [ "$2" != "100" ]; then
      echo "QEMU guest agent is not running" >&2
      exit 255
    fi
    case "$3" in
      ping) ;;
      network-get-interfaces)
        cat <<'JSON'
[
   {
      "hardware-address" : "00:00:00:00:00:00",
      "ip-addresses" : [
         { "ip-address" : "127.0.0.1", "ip-address-type" : "ipv4", "prefix" : 8 }
      ],
      "name" : "lo"
   },
   {
      "hardware-address" : "bc:24:11:aa:bb:cc",
      "ip-addresses" : [
         { "ip-address" : "fe80::be24:11ff:feaa:bbcc", "ip-address-type" : "ipv6", "prefix" : 64 },
         { "ip-address" : "10.0.0.5", "ip-address-type" : "ipv4", "prefix" : 24 }
      ],
      "name" : "eth0"
   }
]
JSON
        ;;
    esac
    ;;
  config)
    echo "boot: order=scsi0"
    echo "cores: 2"
    if [ "$2" = "102" ]; then
      echo "serial0: socket"
    fi
    ;;
  *)
    exit 2
    ;;
esac
"#;

const FAKE_PCT: &str = r#"#!/bin/sh
if [ "$1" = "list" ]; then
  echo "VMID       Status     Lock         Name"
  echo "101        running                 proxy"
  exit 0
fi
exit 2
"#;

const FAILING: &str = "#!/bin/sh\necho \"permission denied\" >&2\nexit 1\n";

/// Scripts are written once, before any test spawns a process. A write fd
/// inherited by a concurrent fork makes exec fail with ETXTBSY.
pub fn fixture_dir() -> &'static Path {
    static DIR: OnceLock<TempDir> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("fail")).unwrap();
        let scripts = [
            ("qm", FAKE_QM),
            ("pct", FAKE_PCT),
            ("fail/qm", FAILING),
            ("fail/pct", FAILING),
        ];
        for (name, body) in scripts {
            let path = dir.path().join(name);
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        dir
    })
    .path()
}

pub fn script(name: &str) -> String {
    fixture_dir().join(name).to_string_lossy().into_owned()
}
