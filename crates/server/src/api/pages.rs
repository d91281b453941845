//! HTML configuration page.
//!
//! The page is self-contained: an inline script re-encodes the form state
//! into the opaque token and builds the `stremio://` install link, so the
//! server never sees or stores the user's key outside request paths.

use debridge_core::UserConfig;

/// Providers offered in the dropdown, value and display label.
const PROVIDERS: [(&str, &str); 5] = [
    ("realdebrid", "Real-Debrid"),
    ("alldebrid", "All-Debrid"),
    ("premiumize", "Premiumize"),
    ("torbox", "TorBox"),
    ("debridlink", "Debrid-Link"),
];

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Debridge - Stremio Addon</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.6;
            background: #1a1a1a;
            color: #ffffff;
        }
        .logo { text-align: center; margin-bottom: 30px; }
        .card {
            background: #2a2a2a;
            border-radius: 8px;
            padding: 20px;
            margin: 20px 0;
            border: 1px solid #404040;
        }
        .form-group { margin: 15px 0; }
        label { display: block; margin-bottom: 5px; color: #cccccc; }
        input, select {
            width: 100%;
            padding: 10px;
            border-radius: 4px;
            border: 1px solid #555;
            background: #333;
            color: #fff;
            box-sizing: border-box;
        }
        .install-btn {
            background: #7b2cbf;
            color: white;
            padding: 12px 24px;
            border: none;
            border-radius: 6px;
            cursor: pointer;
            text-decoration: none;
            display: inline-block;
            font-size: 16px;
            margin: 10px 5px;
        }
        .install-btn:hover { background: #9d4edd; }
        .warning {
            background: #664d00;
            border-left: 4px solid #ffa500;
            padding: 15px;
            border-radius: 4px;
            margin: 20px 0;
        }
    </style>
</head>
<body>
    <div class="logo">
        <h1>🎬 Debridge</h1>
        <p>Stremio Addon for Debrid Cloud Content</p>
    </div>

    <div class="card">
        <h3>Configuration</h3>
        <div class="form-group">
            <label for="debridProvider">Debrid Provider:</label>
            <select id="debridProvider" onchange="updateConfig()">
                {{provider_options}}
            </select>
        </div>

        <div class="form-group">
            <label for="apiKey">API Key:</label>
            <input type="password" id="apiKey" placeholder="Enter your API key" value="{{api_key}}" onchange="updateConfig()">
        </div>

        <div class="form-group">
            <label for="maxResults">Max Results:</label>
            <input type="number" id="maxResults" min="1" max="50" value="{{max_results}}" onchange="updateConfig()">
        </div>
    </div>

    <div class="warning">
        <strong>Note:</strong> This addon only shows streaming links for downloads and torrents already present in your Debrid account. It does not search for new content.
    </div>

    <div class="card" style="text-align: center;">
        <h3>Install to Stremio</h3>
        <a href="#" id="installLink" class="install-btn">Install Addon</a>
        <p style="font-size: 14px; color: #888;">
            Click to install this configured addon to Stremio
        </p>
    </div>

    <script>
        function updateConfig() {
            const provider = document.getElementById('debridProvider').value;
            const apiKey = document.getElementById('apiKey').value;
            const maxResults = document.getElementById('maxResults').value;

            const config = btoa(JSON.stringify({
                debridProvider: provider,
                apiKey: apiKey,
                maxResults: parseInt(maxResults) || 10
            }));

            const manifestUrl = window.location.host + '/' + config + '/manifest.json';
            document.getElementById('installLink').href = 'stremio://' + manifestUrl;
        }

        updateConfig(); // Initialize
    </script>
</body>
</html>"##;

/// Render the configure page with the decoded token's values pre-filled.
pub fn render_configure(config: &UserConfig) -> String {
    let options: Vec<String> = PROVIDERS
        .iter()
        .map(|(value, label)| {
            let selected = if config.debrid_provider == *value {
                " selected"
            } else {
                ""
            };
            format!(r#"<option value="{value}"{selected}>{label}</option>"#)
        })
        .collect();

    TEMPLATE
        .replace("{{provider_options}}", &options.join("\n                "))
        .replace("{{api_key}}", &html_escape(&config.api_key))
        .replace("{{max_results}}", &config.max_results.to_string())
}

/// Minimal escaping for attribute values interpolated into the template.
fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
