// src/block_page.rs
// The fixed 403 page served to blocked clients.

pub fn render_block_page() -> String {
    ACCESS_FORBIDDEN_HTML.to_string()
}

const ACCESS_FORBIDDEN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Access Forbidden</title>
  <style>
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; display: flex; justify-content: center; align-items: center; min-height: 100vh; margin: 0; background: #f5f5f5; color: #333; }
    .container { text-align: center; padding: 40px; background: #fff; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
    h1 { color: #dc3545; margin-bottom: 20px; }
    p { color: #666; line-height: 1.6; }
  </style>
</head>
<body>
  <div class="container">
    <h1>403 - Access Forbidden</h1>
    <p>Automated requests are not allowed.</p>
  </div>
</body>
</html>
"#;
