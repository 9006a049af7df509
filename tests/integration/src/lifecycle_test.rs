//! End-to-end test of the driver lifecycle
//!
//! settings file -> install -> activate -> switch -> deactivate, checking the
//! boot configuration and its backups after every step.

use std::fs;
use std::path::{Path, PathBuf};

use frame_drivers::{
    Activator, Catalog, DriverOrigin, Error, Extractor, PackageInstaller, Result, Settings,
};
use frame_test_utils::{TestSystem, write_manifest};
use pretty_assertions::assert_eq;

const USER_CONFIG: &str = "# user settings\ngpu_mem=128\r\nhdmi_group=2\n";

/// Treats an unpacked package directory as the archive.
struct CopyExtractor;

impl Extractor for CopyExtractor {
    fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        copy_tree(archive, destination).map_err(|e| Error::Extraction {
            archive: archive.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

struct Device {
    system: TestSystem,
    settings: Settings,
}

impl Device {
    fn new() -> Self {
        let system = TestSystem::new();
        system.write_boot_config(USER_CONFIG);
        let settings = Settings::load(&system.write_settings()).unwrap();
        Self { system, settings }
    }

    fn installer(&self) -> PackageInstaller<CopyExtractor> {
        PackageInstaller::new(&self.settings.external_root, CopyExtractor)
            .with_temp_root(self.settings.temp_root.clone().unwrap())
    }

    fn activator(&self) -> Activator {
        Activator::from_settings(&self.settings)
    }

    fn package(&self, name: &str, config: &str) -> PathBuf {
        let destination = self.system.dest_dir().join(format!("{name}.dtbo"));
        let overlay = format!("overlays/{name}.dtbo");
        write_manifest(
            &self.system.packages_dir(),
            name,
            &format!(
                "[Install]\noverlays/{name}.dtbo = {}\n\n[Config]\n{config}\n",
                destination.display()
            ),
            &[(overlay.as_str(), name)],
        );
        self.system.packages_dir().join(name)
    }

    fn boot_config(&self) -> String {
        self.system.read_boot_config()
    }
}

fn marker() -> &'static str {
    frame_drivers::settings::DEFAULT_MARKER
}

#[test]
fn test_settings_file_points_everywhere() {
    let device = Device::new();

    assert_eq!(device.settings.boot_config, device.system.boot_config());
    assert_eq!(device.settings.external_root, device.system.external_root());
    assert_eq!(device.settings.marker, marker());
}

#[test]
fn test_full_lifecycle() {
    let device = Device::new();
    let activator = device.activator();

    let tft = device.installer().install(&device.package("tft35a", "dtoverlay=tft35a:rotate=90")).unwrap();
    let wave = device.installer().install(&device.package("waveshare", "dtoverlay=waveshare\nhdmi_cvt=480 320 60 6 0 0 0")).unwrap();
    assert_eq!(tft.install_entries[0].source, PathBuf::from("tft35a.dtbo"));
    assert_eq!(wave.config_lines.len(), 2);

    let listed: Vec<String> = activator.catalog().list().into_keys().collect();
    assert_eq!(listed, vec!["tft35a", "waveshare"]);

    // Installing alone leaves the boot configuration alone.
    assert_eq!(device.boot_config(), USER_CONFIG);

    activator.activate(Some("tft35a")).unwrap();
    let first = device.boot_config();
    assert_eq!(
        first,
        format!("# user settings\ngpu_mem=128\nhdmi_group=2\n{}\ndtoverlay=tft35a:rotate=90\n", marker())
    );
    assert_eq!(device.system.read_backup(".original").as_deref(), Some(USER_CONFIG));
    assert!(device.system.dest_dir().join("tft35a.dtbo").is_file());

    activator.activate(Some("waveshare")).unwrap();
    assert_eq!(
        device.boot_config(),
        format!(
            "# user settings\ngpu_mem=128\nhdmi_group=2\n{}\ndtoverlay=waveshare\nhdmi_cvt=480 320 60 6 0 0 0\n",
            marker()
        )
    );
    assert_eq!(device.system.read_backup(".old"), Some(first));
    assert_eq!(device.system.read_backup(".original").as_deref(), Some(USER_CONFIG));

    activator.activate(None).unwrap();
    assert_eq!(device.boot_config(), "# user settings\ngpu_mem=128\nhdmi_group=2\n");
    assert_eq!(device.system.read_backup(".original").as_deref(), Some(USER_CONFIG));
    assert_eq!(device.system.read_backup(".new"), None);
}

#[test]
fn test_user_edits_before_marker_survive_reactivation() {
    let device = Device::new();
    let activator = device.activator();
    device.installer().install(&device.package("tft35a", "dtoverlay=tft35a")).unwrap();
    activator.activate(Some("tft35a")).unwrap();

    let edited = device.boot_config().replace("gpu_mem=128", "gpu_mem=256");
    device.system.write_boot_config(&edited);
    activator.activate(Some("tft35a")).unwrap();

    let content = device.boot_config();
    assert!(content.starts_with("# user settings\ngpu_mem=256\n"));
    assert_eq!(
        frame_blocks::managed_section(&content, marker()),
        Some(vec!["dtoverlay=tft35a"])
    );
}

#[test]
fn test_external_driver_shadows_builtin() {
    let device = Device::new();
    let builtin_dest = device.system.dest_dir().join("builtin.dtbo");
    let legacy = serde_json::json!({
        "driver": "tft35a",
        "install": [{"src": "tft35a.dtbo", "dst": builtin_dest}],
        "options": ["dtoverlay=builtin"],
    });
    device
        .system
        .add_builtin_driver("tft35a", &legacy.to_string(), &[("tft35a.dtbo", "builtin")]);
    let catalog = Catalog::new(&device.settings.builtin_root, &device.settings.external_root);
    let activator = device.activator();

    activator.activate(Some("tft35a")).unwrap();
    assert!(device.boot_config().ends_with("dtoverlay=builtin\n"));

    device.installer().install(&device.package("tft35a", "dtoverlay=external")).unwrap();
    assert_eq!(catalog.origin("tft35a"), Some(DriverOrigin::External));
    activator.activate(Some("tft35a")).unwrap();
    assert!(device.boot_config().ends_with("dtoverlay=external\n"));

    device.installer().remove(&catalog, "tft35a").unwrap();
    activator.activate(Some("tft35a")).unwrap();
    assert!(device.boot_config().ends_with("dtoverlay=builtin\n"));
}

#[test]
fn test_failed_install_does_not_disturb_active_driver() {
    let device = Device::new();
    let activator = device.activator();
    device.installer().install(&device.package("tft35a", "dtoverlay=tft35a")).unwrap();
    activator.activate(Some("tft35a")).unwrap();
    let before = device.boot_config();

    let broken = device.system.packages_dir().join("broken");
    write_manifest(&device.system.packages_dir(), "broken", "[Install]\n../../etc/passwd=/etc/passwd\n", &[]);
    let err = device.installer().install(&broken).unwrap_err();

    assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    assert_eq!(device.boot_config(), before);
    assert!(!device.system.external_root().join("broken").exists());
    assert!(device.system.list_dir(&device.system.work_dir()).is_empty());
}
