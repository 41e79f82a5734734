//! Sample templates and documents shared by tests.

/// Cloud-config template using one variable and one function call.
pub const WEB_TEMPLATE: &str = "#cloud-config
hostname: ${var.hostname}
coreos:
  update:
    reboot_strategy: ${lower(var.strategy)}
";

/// [`WEB_TEMPLATE`] rendered with `hostname = "web-1"` and `strategy = "ETCD-LOCK"`.
pub const WEB_RENDERED: &str = "#cloud-config
hostname: web-1
coreos:
  update:
    reboot_strategy: etcd-lock
";

/// Cloud-config document with one error and one warning.
pub const INVALID_CLOUD_CONFIG: &str = "#cloud-config
coreos:
  update:
    reboot_strategy: sometimes
bogus_key: true
";

/// Project file with an inline template and a file template.
pub fn project_manifest(template_file: &str) -> String {
    format!(
        r#"[resources.hello]
template = "hello ${{var.name}}"
gzip = false
validate = false
vars = {{ name = "world" }}

[resources.web]
template_file = "{template_file}"

[resources.web.vars]
hostname = "web-1"
strategy = "ETCD-LOCK"
"#
    )
}
