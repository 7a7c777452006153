pub fn render_maintenance(message: &str, return_text: &str) -> String {
    MAINTENANCE_HTML
        .replace("{{MESSAGE}}", &escape_html(message))
        .replace("{{RETURN}}", &escape_html(return_text))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const MAINTENANCE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta http-equiv="refresh" content="300" />
  <title>Area22 | Down for maintenance</title>
  <style>
    :root {
      --bg-1: #0d0d12;
      --bg-2: #1f1030;
      --ink: #f4f1ff;
      --accent: #ff6b35;
      --muted: rgba(244, 241, 255, 0.7);
      --card: rgba(255, 255, 255, 0.06);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      display: grid;
      place-items: center;
      font-family: "Segoe UI", system-ui, sans-serif;
      color: var(--ink);
      background: radial-gradient(circle at top, var(--bg-2), var(--bg-1) 70%);
    }

    main {
      width: min(560px, 92vw);
      padding: 48px 40px;
      border-radius: 28px;
      background: var(--card);
      text-align: center;
      box-shadow: 0 24px 60px rgba(0, 0, 0, 0.45);
    }

    h1 {
      margin: 0 0 16px;
      font-size: clamp(1.8rem, 4vw, 2.6rem);
    }

    .maintenance-description {
      color: var(--muted);
      line-height: 1.6;
    }

    .status-item {
      margin-top: 28px;
      display: inline-flex;
      gap: 10px;
      padding: 10px 20px;
      border-radius: 999px;
      border: 1px solid var(--accent);
    }

    .status-value {
      color: var(--accent);
      font-weight: 600;
    }
  </style>
</head>
<body>
  <main>
    <h1>We'll be right back</h1>
    <p class="maintenance-description">{{MESSAGE}}</p>
    <div class="status-item">
      <span>Expected return</span>
      <span class="status-value">{{RETURN}}</span>
    </div>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_escaped() {
        let html = render_maintenance("<script>alert(1)</script>", "Soon");
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains(">Soon<"));
    }
}
