//! Landing page served at `/`.

use axum::response::Html;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Proxy</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 4rem auto; padding: 0 1rem; }
    form { display: flex; gap: .5rem; }
    input { flex: 1; padding: .5rem; font-size: 1rem; }
    button { padding: .5rem 1rem; font-size: 1rem; }
  </style>
</head>
<body>
  <h1>Proxy</h1>
  <form id="go">
    <input id="url" type="text" placeholder="https://example.com/" autofocus required>
    <button type="submit">Go</button>
  </form>
  <script>
    document.getElementById('go').addEventListener('submit', function (event) {
      event.preventDefault();
      var url = document.getElementById('url').value.trim();
      if (url) {
        window.location.href = '/' + encodeURIComponent(url);
      }
    });
  </script>
</body>
</html>
"#;

/// `GET /`: static form that navigates to `/<encoded url>`.
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}
