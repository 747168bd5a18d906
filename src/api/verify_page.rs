use crate::database::models::QrCode;

pub const INVALID_CODE_MESSAGE: &str = "QR code is not valid or is no longer active";

const STYLE: &str = r#"
    body { margin: 0; font-family: Arial, Helvetica, sans-serif; background: #f0fdfa; color: #1f2937; }
    .card { max-width: 640px; margin: 32px auto; background: #ffffff; border-radius: 8px; overflow: hidden; box-shadow: 0 1px 4px rgba(0,0,0,.1); }
    .banner { padding: 24px; text-align: center; color: #ffffff; font-size: 20px; font-weight: bold; }
    .valid { background: #16a34a; }
    .invalid { background: #dc2626; }
    .issuer { padding: 32px 24px; text-align: center; color: #16a34a; font-size: 20px; font-weight: bold; border-bottom: 1px solid #e5e7eb; }
    .rows { padding: 16px 24px 48px; background: #f8fafc; }
    .row { display: flex; justify-content: space-between; gap: 16px; background: #ffffff; padding: 14px 16px; margin: 12px 0; border-radius: 6px; }
    .label { color: #0d9488; font-weight: 600; }
    .value { text-align: right; word-break: break-word; }
    .section { margin: 24px 0 4px; color: #0d9488; font-weight: bold; }
    .message { padding: 32px 24px; text-align: center; color: #dc2626; }
"#;

/// Full page shown for an active certificate
pub fn render_valid_page(qr_code: &QrCode, issuer_name: &str) -> String {
    let data = &qr_code.data;
    let mut rows = String::new();

    push_row(&mut rows, "CLIENT NAME", &qr_code.client_name);
    for (label, value) in [
        ("TB/BG/VESSEL", &data.vessel),
        ("QUANTITY", &data.quantity),
        ("PORT OF LOADING", &data.port_loading),
        ("PORT OF DISCHARGING", &data.port_discharging),
        ("CERTIFICATE NUMBER", &data.certificate_number),
        ("COMMODITY", &data.commodity),
        ("BRANCH", &data.branch),
    ] {
        if !value.is_empty() {
            push_row(&mut rows, label, value);
        }
    }

    if data.has_parameter_results() {
        rows.push_str("<div class=\"section\">PARAMETER RESULT</div>\n");
        for (label, value) in [
            ("- ASH CONTENT/AC (adb)", &data.ash_content),
            ("- TOTAL SULPHUR/TS (adb)", &data.total_sulphur),
            ("- CALORIFIC VALUE (arb)", &data.calorific_value),
        ] {
            if !value.is_empty() {
                push_row(&mut rows, label, value);
            }
        }
    }

    page(
        &format!("{} - Verification", escape_html(&qr_code.title)),
        &format!(
            r#"<div class="banner valid">VALID VERIFICATION CODE</div>
<div class="issuer">{issuer}</div>
<div class="rows">
{rows}</div>"#,
            issuer = escape_html(issuer_name),
            rows = rows,
        ),
    )
}

/// Error state for missing, malformed or inactive codes
pub fn render_invalid_page() -> String {
    page(
        "Invalid QR Code",
        &format!(
            r#"<div class="banner invalid">Invalid QR Code</div>
<div class="message">{}</div>"#,
            INVALID_CODE_MESSAGE
        ),
    )
}

fn push_row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        "<div class=\"row\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>\n",
        escape_html(label),
        escape_html(value)
    ));
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<div class="card">
{body}
</div>
</body>
</html>
"#,
        title = title,
        style = STYLE,
        body = body,
    )
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
