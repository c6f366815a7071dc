//! The single page served to the browser.
//!
//! Values substituted into the template are limited to the session secret
//! (URL-safe base64), a validated account name and a fixed mode string, so
//! none of them can break out of their HTML or script context.

use super::Mode;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>roster · sign in</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 32rem; margin: 4rem auto; padding: 0 1rem; color: #1f2328; }
  h1 { font-size: 1.4rem; }
  label { display: block; margin-top: 1rem; font-weight: 600; }
  input { width: 100%; box-sizing: border-box; padding: .5rem; margin-top: .25rem; font: inherit; }
  button { margin-top: 1rem; padding: .5rem 1rem; font: inherit; cursor: pointer; }
  #status { margin-top: 1rem; min-height: 1.5rem; }
  .error { color: #cf222e; }
  .ok { color: #1a7f37; }
  #accounts li { margin: .25rem 0; }
  #accounts button { margin: 0 0 0 .5rem; padding: .1rem .5rem; }
  .hidden { display: none; }
</style>
</head>
<body>
<h1>Connect roster to your account</h1>
<p>Paste an API token. It is checked against the API and stored on this machine only.</p>
<form id="form" autocomplete="off">
  <label for="account">Account name</label>
  <input id="account" name="account" value="{{ACCOUNT}}" maxlength="64" pattern="[A-Za-z0-9_-]+" required>
  <label for="token">API token</label>
  <input id="token" name="token" type="password" maxlength="4096" required>
  <button type="submit" id="submit">Save token</button>
  <button type="button" id="cancel">Cancel</button>
</form>
<div id="status" role="status"></div>
<section id="manage" class="hidden">
  <h2>Stored accounts</h2>
  <ul id="accounts"></ul>
</section>
<script>
(function () {
  "use strict";
  var SESSION = "{{SESSION}}";
  var MODE = "{{MODE}}";
  var statusEl = document.getElementById("status");
  var form = document.getElementById("form");

  function show(message, ok) {
    statusEl.textContent = message;
    statusEl.className = ok ? "ok" : "error";
  }

  function call(method, path, body) {
    var init = { method: method, headers: { "x-roster-session": SESSION } };
    if (body !== undefined) {
      init.headers["content-type"] = "application/json";
      init.body = JSON.stringify(body);
    }
    return fetch(path, init).then(function (res) {
      return res.json().catch(function () {
        return { ok: false, message: "unexpected response (HTTP " + res.status + ")" };
      });
    });
  }

  function closeForm(message, ok) {
    show(message, ok);
    form.classList.add("hidden");
    document.getElementById("manage").classList.add("hidden");
  }

  function loadAccounts() {
    call("GET", "/api/accounts").then(function (data) {
      var list = document.getElementById("accounts");
      list.textContent = "";
      (data.accounts || []).forEach(function (acct) {
        var li = document.createElement("li");
        li.textContent = acct.name + " (" + acct.masked + ")";
        var del = document.createElement("button");
        del.type = "button";
        del.textContent = "Remove";
        del.addEventListener("click", function () {
          call("DELETE", "/api/accounts/" + encodeURIComponent(acct.name)).then(function (r) {
            show(r.message, r.ok);
            loadAccounts();
          });
        });
        li.appendChild(del);
        list.appendChild(li);
      });
    });
  }

  form.addEventListener("submit", function (ev) {
    ev.preventDefault();
    var button = document.getElementById("submit");
    button.disabled = true;
    show("Checking token…", true);
    call("POST", "/api/token", {
      account: document.getElementById("account").value,
      token: document.getElementById("token").value
    }).then(function (r) {
      if (r.ok) {
        closeForm(r.message + " You can close this window and return to the terminal.", true);
        return;
      }
      var message = r.message;
      if (typeof r.remaining_attempts === "number") {
        message += " (" + r.remaining_attempts + " attempts left)";
      }
      if (r.closed) {
        closeForm(message, false);
        return;
      }
      show(message, false);
      button.disabled = false;
    }).catch(function () {
      show("Lost contact with roster. Is the command still running?", false);
      button.disabled = false;
    });
  });

  document.getElementById("cancel").addEventListener("click", function () {
    call("POST", "/api/cancel").then(function (r) {
      closeForm(r.message, r.ok);
    });
  });

  if (MODE === "manage") {
    document.getElementById("manage").classList.remove("hidden");
    loadAccounts();
  }
})();
</script>
</body>
</html>
"#;

/// Render the page for one session.
pub(super) fn render(mode: Mode, session: &str, default_account: &str) -> String {
    TEMPLATE
        .replace("{{SESSION}}", session)
        .replace("{{MODE}}", mode.as_str())
        .replace("{{ACCOUNT}}", default_account)
}
