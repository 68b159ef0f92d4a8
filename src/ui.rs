//! HTML shell: splash page and dashboard.
//!
//! Both pages are static; the dashboard pulls everything from the JSON API.

pub fn render_splash(splash_ms: u64) -> String {
    // ---
    // meta refresh only covers clients with scripting disabled
    let refresh_secs = splash_ms.div_ceil(1000) + 1;
    SPLASH_HTML
        .replace("{{SPLASH_MS}}", &splash_ms.to_string())
        .replace("{{REFRESH_SECS}}", &refresh_secs.to_string())
}

pub fn render_dashboard() -> String {
    DASHBOARD_HTML.to_string()
}

const SPLASH_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta http-equiv="refresh" content="{{REFRESH_SECS}};url=/dashboard" />
  <title>HydroLock</title>
  <style>
    body {
      margin: 0;
      min-height: 100vh;
      display: grid;
      place-items: center;
      overflow: hidden;
      background: linear-gradient(135deg, #eff6ff, #ecfeff 50%, #dbeafe);
      font-family: system-ui, -apple-system, sans-serif;
      color: #1e40af;
    }
    .brand { display: flex; flex-direction: column; align-items: center; gap: 16px; }
    .logo {
      width: 140px; height: 140px; border-radius: 50%;
      display: grid; place-items: center;
      background: #bfdbfe; font-size: 2.6rem; font-weight: 700;
      animation: heartbeat 1.5s ease-in-out infinite;
    }
    h1 { margin: 0; font-size: 3rem; letter-spacing: 0.04em; }
    h1 .light { font-weight: 300; }
    .subtitle { margin: 0; color: #2563eb; opacity: 0.8; font-size: 1.2rem; }
    .bar { width: 256px; height: 8px; border-radius: 999px; background: #bfdbfe; overflow: hidden; }
    .bar div {
      height: 100%; width: 0; border-radius: 999px;
      background: linear-gradient(90deg, #60a5fa, #2563eb);
      animation: fill {{SPLASH_MS}}ms linear forwards;
    }
    @keyframes heartbeat {
      0%, 100% { transform: scale(1); }
      25% { transform: scale(1.05); }
      50% { transform: scale(1.1); }
      75% { transform: scale(1.05); }
    }
    @keyframes fill { from { width: 0; } to { width: 100%; } }
  </style>
</head>
<body>
  <div class="brand">
    <div class="logo">HL</div>
    <h1><span class="light">HYDRO</span><strong>LOCK</strong></h1>
    <p class="subtitle">Secure Water Management</p>
    <div class="bar"><div></div></div>
  </div>
  <script>
    setTimeout(() => { window.location.replace('/dashboard'); }, {{SPLASH_MS}});
  </script>
</body>
</html>
"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Water Usage Dashboard</title>
  <style>
    body {
      margin: 0;
      min-height: 100vh;
      padding: 24px;
      background: linear-gradient(135deg, #e0f2fe, #e0f7fa);
      font-family: system-ui, -apple-system, sans-serif;
      color: #1f2937;
    }
    main { max-width: 1200px; margin: 0 auto; }
    h1 { font-size: 2.5rem; margin: 0 0 8px; }
    .conn { display: inline-block; padding: 8px 16px; border-radius: 20px; font-size: 0.875rem; font-weight: 500; }
    .conn.on { background: #d1fae5; color: #065f46; }
    .conn.off { background: #fee2e2; color: #991b1b; }
    .error { color: #dc2626; background: #fef2f2; border: 1px solid #fecaca; border-radius: 8px; padding: 12px; margin: 16px 0; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 24px; margin: 32px 0; }
    .card { background: white; border-radius: 16px; box-shadow: 0 10px 25px rgba(0, 0, 0, 0.1); padding: 24px; border: 1px solid #e5e7eb; }
    .label { font-size: 0.875rem; color: #6b7280; margin: 0 0 4px; }
    .value { font-size: 2rem; font-weight: 700; margin: 0 0 4px; }
    .unit { font-size: 0.875rem; color: #9ca3af; margin: 0; }
    .badge { display: inline-block; margin-top: 12px; padding: 4px 12px; border-radius: 20px; font-size: 0.75rem; font-weight: 500; }
    .badge.Low { background: #d1fae5; color: #10b981; }
    .badge.Normal { background: #dbeafe; color: #3b82f6; }
    .badge.High { background: #fee2e2; color: #ef4444; }
    .buttons { display: flex; flex-wrap: wrap; gap: 8px; margin-bottom: 24px; }
    button { padding: 8px 16px; border-radius: 8px; border: none; cursor: pointer; font-weight: 500; background: #f3f4f6; color: #374151; }
    button.active, button.connect { background: #2563eb; color: white; }
    button:disabled { opacity: 0.6; cursor: default; }
    #chart { width: 100%; height: 400px; display: block; }
    .axis { fill: #666; font-size: 12px; }
    .grid-line { stroke: #f0f0f0; }
    .usage-line { fill: none; stroke: #2563eb; stroke-width: 3; }
    .target-line { fill: none; stroke: #dc2626; stroke-width: 2; stroke-dasharray: 5 5; }
    .usage-bar { fill: #2563eb; }
    .target-bar { fill: #dc2626; }
    pre { font-size: 0.875rem; color: #6b7280; background: #f1f5f9; padding: 8px; border-radius: 4px; max-height: 200px; overflow-y: auto; }
  </style>
</head>
<body>
  <main>
    <h1>Water Usage Dashboard</h1>
    <span id="conn" class="conn off">Disconnected</span>
    <div id="error" class="error" hidden></div>

    <section class="grid">
      <div class="card">
        <p class="label">Current Usage</p>
        <p class="value" id="current-usage">0.00</p>
        <p class="unit">liters</p>
        <span id="status" class="badge Low">Low</span>
      </div>
      <div class="card">
        <p class="label">Flow Rate</p>
        <p class="value" id="flow-rate">0.0</p>
        <p class="unit">L/min</p>
      </div>
      <div class="card">
        <p class="label">Average Usage</p>
        <p class="value" id="average-usage">0.00</p>
        <p class="unit">liters</p>
      </div>
      <div class="card">
        <p class="label">Data Points</p>
        <p class="value" id="data-points">0</p>
        <p class="unit">records</p>
      </div>
    </section>

    <section class="card">
      <div class="buttons">
        <button class="connect" id="connect">Connect</button>
        <button data-period="daily" class="active">Daily</button>
        <button data-period="weekly">Weekly</button>
        <button data-period="monthly">Monthly</button>
      </div>
      <svg id="chart" viewBox="0 0 900 400" role="img" aria-label="Water usage chart"></svg>
    </section>

    <section class="card" style="margin-top: 24px">
      <h4>Debug: Raw Telemetry Data</h4>
      <pre id="raw">[]</pre>
    </section>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    const periodButtons = Array.from(document.querySelectorAll('[data-period]'));
    const allButtons = Array.from(document.querySelectorAll('button'));
    let activePeriod = 'daily';

    const setBusy = (busy) => allButtons.forEach((b) => { b.disabled = busy; });

    const setConnection = (connected, error) => {
      const el = $('conn');
      el.textContent = connected ? 'Connected' : 'Disconnected';
      el.className = 'conn ' + (connected ? 'on' : 'off');
      $('connect').textContent = connected ? 'Reconnect' : 'Connect';
      const err = $('error');
      err.hidden = !error;
      err.textContent = error ? 'Error: ' + error : '';
    };

    const labelFor = (point) => {
      if (point.date) {
        return new Date(point.date + 'T00:00:00Z')
          .toLocaleDateString('en-US', { month: 'short', day: 'numeric', timeZone: 'UTC' });
      }
      return point.week || point.month || point.id || '';
    };

    const renderChart = (points, asLine) => {
      const svg = $('chart');
      if (!points.length) {
        svg.innerHTML = '<text class="axis" x="450" y="200" text-anchor="middle">No data available.</text>';
        return;
      }
      const w = 900, h = 400, left = 56, right = 24, top = 24, bottom = 40;
      const max = Math.max(1, ...points.flatMap((p) => [p.usage || 0, p.target || 0]));
      const y = (v) => h - bottom - (v / max) * (h - top - bottom);
      const slot = (w - left - right) / points.length;
      const cx = (i) => left + slot * i + slot / 2;

      let out = '';
      for (let i = 0; i <= 4; i += 1) {
        const v = (max * i) / 4;
        out += `<line class="grid-line" x1="${left}" x2="${w - right}" y1="${y(v)}" y2="${y(v)}" />`;
        out += `<text class="axis" x="${left - 8}" y="${y(v) + 4}" text-anchor="end">${v.toFixed(0)}</text>`;
      }
      points.forEach((p, i) => {
        out += `<text class="axis" x="${cx(i)}" y="${h - bottom + 18}" text-anchor="middle">${labelFor(p)}</text>`;
      });

      if (asLine) {
        const path = (key) => points.map((p, i) => `${i ? 'L' : 'M'} ${cx(i)} ${y(p[key] || 0)}`).join(' ');
        out += `<path class="target-line" d="${path('target')}" />`;
        out += `<path class="usage-line" d="${path('usage')}" />`;
      } else {
        const bw = Math.min(40, slot / 3);
        points.forEach((p, i) => {
          const u = p.usage || 0, t = p.target || 0;
          out += `<rect class="usage-bar" x="${cx(i) - bw - 2}" y="${y(u)}" width="${bw}" height="${y(0) - y(u)}"><title>${u.toFixed(1)} L</title></rect>`;
          out += `<rect class="target-bar" x="${cx(i) + 2}" y="${y(t)}" width="${bw}" height="${y(0) - y(t)}"><title>${t.toFixed(1)} L</title></rect>`;
        });
      }
      svg.innerHTML = out;
    };

    const renderView = (view) => {
      setConnection(view.connected, view.error);
      const s = view.summary;
      $('current-usage').textContent = s.currentUsage.toFixed(2);
      $('flow-rate').textContent = s.currentFlowRate.toFixed(1);
      $('average-usage').textContent = s.averageUsage.toFixed(2);
      $('data-points').textContent = s.dataPoints;
      $('status').textContent = s.status;
      $('status').className = 'badge ' + s.status;
      renderChart(view.points, view.period === 'daily');
    };

    const loadRaw = async () => {
      const res = await fetch('/api/raw');
      if (res.ok) {
        $('raw').textContent = JSON.stringify(await res.json(), null, 2);
      }
    };

    const load = async (period) => {
      setBusy(true);
      try {
        const res = await fetch('/api/usage?period=' + encodeURIComponent(period));
        if (!res.ok) {
          throw new Error('Unable to load usage');
        }
        renderView(await res.json());
        await loadRaw();
      } catch (err) {
        setConnection(false, err.message);
      } finally {
        setBusy(false);
      }
    };

    const setPeriod = (period) => {
      activePeriod = period;
      periodButtons.forEach((b) => b.classList.toggle('active', b.dataset.period === period));
      load(period);
    };

    periodButtons.forEach((b) => b.addEventListener('click', () => setPeriod(b.dataset.period)));

    $('connect').addEventListener('click', async () => {
      setBusy(true);
      $('connect').textContent = 'Connecting...';
      try {
        const res = await fetch('/api/connect', { method: 'POST' });
        const status = await res.json();
        setConnection(status.connected, status.error);
      } catch (err) {
        setConnection(false, err.message);
      } finally {
        setBusy(false);
      }
      load(activePeriod);
    });

    load(activePeriod);
  </script>
</body>
</html>
"#;
