use crate::models::{BoardResponse, FlowView, GoalView};

pub fn render_index(board: &BoardResponse) -> String {
    let cards: String = board.goals.iter().map(render_card).collect();
    INDEX_HTML
        .replace("{{REVISION}}", &board.revision.to_string())
        .replace("{{COUNT}}", &board.goals.len().to_string())
        .replace("{{GOAL_CARDS}}", &cards)
}

fn render_card(goal: &GoalView) -> String {
    let flow = goal
        .flow
        .as_ref()
        .map(|flow| render_flow(goal.index, flow))
        .unwrap_or_default();
    format!(
        r#"<div class="goal-card" data-index="{index}">
          <div class="circular" style="--angle: {angle}deg;"><span class="perc-text">{perc}%</span></div>
          <div class="goal-info"><b>{name}</b><br>{completed}/{target} days<br><small>{streak}</small></div>
          <div class="goal-actions">
            <form method="post" action="/goals/{index}/complete" data-action="complete" data-id="{id}">
              <button class="done-btn" type="submit">✔</button>
            </form>
            <form method="post" action="/goals/{index}/remove" data-action="remove" data-id="{id}" data-name="{name}">
              <label class="confirm-box"><input type="checkbox" name="confirmed" value="true" /> sure</label>
              <button class="remove-btn" type="submit">✖</button>
            </form>
          </div>{flow}
        </div>
"#,
        index = goal.index,
        angle = goal.angle,
        perc = goal.percentage,
        name = escape_html(&goal.name),
        completed = goal.completed_days,
        target = goal.target_days,
        streak = goal.streak,
        id = goal.id,
        flow = flow,
    )
}

fn render_flow(index: usize, flow: &FlowView) -> String {
    let prompt = escape_html(&flow.prompt);
    match flow.default_amount.as_deref() {
        Some(amount) => format!(
            r#"
          <form class="flow" method="post" action="/goals/{index}/extend" data-action="extend" data-id="{id}">
            <p class="flow-prompt">{prompt}</p>
            <input type="text" name="days" value="{amount}" />
            <button class="add-btn" type="submit">Add days</button>
          </form>"#,
            id = flow.goal_id,
            amount = escape_html(amount),
        ),
        None => format!(
            r#"
          <form class="flow" method="post" action="/goals/{index}/decision" data-action="decision" data-id="{id}">
            <p class="flow-prompt">{prompt}</p>
            <button class="add-btn" type="submit" name="keep_going" value="true">Keep going</button>
            <button class="remove-btn" type="submit" name="keep_going" value="false">Stop here</button>
          </form>"#,
            id = flow.goal_id,
        ),
    }
}

pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(720px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    .inputs {
      display: grid;
      grid-template-columns: 2fr 1fr auto;
      gap: 12px;
    }

    input {
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 12px;
      padding: 12px 14px;
      font-size: 1rem;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-weight: 600;
      cursor: pointer;
    }

    .add-btn {
      background: var(--accent);
      color: white;
    }

    #goalList {
      display: grid;
      gap: 14px;
    }

    .goal-card {
      background: white;
      border-radius: 18px;
      padding: 16px;
      display: grid;
      grid-template-columns: auto 1fr auto;
      align-items: center;
      gap: 16px;
    }

    .circular {
      width: 64px;
      height: 64px;
      border-radius: 50%;
      background: conic-gradient(var(--accent) var(--angle), rgba(47, 72, 88, 0.12) 0deg);
      display: grid;
      place-items: center;
    }

    .perc-text {
      background: white;
      border-radius: 50%;
      width: 48px;
      height: 48px;
      display: grid;
      place-items: center;
      font-size: 0.85rem;
      font-weight: 600;
    }

    .done-btn {
      background: var(--accent-2);
      color: white;
    }

    .remove-btn {
      background: rgba(47, 72, 88, 0.1);
      color: var(--accent-2);
    }

    .goal-actions {
      display: flex;
      gap: 8px;
    }

    .goal-actions form {
      display: flex;
      align-items: center;
      gap: 6px;
    }

    body.js .confirm-box {
      display: none;
    }

    .flow {
      grid-column: 1 / -1;
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 10px;
    }

    .flow-prompt {
      flex-basis: 100%;
      margin: 0;
      white-space: pre-line;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }
  </style>
</head>
<body>
  <main class="app" data-revision="{{REVISION}}">
    <h1>Habit Tracker</h1>

    <form class="inputs" id="addForm" method="post" action="/goals">
      <input id="goalName" name="name" type="text" placeholder="Habit name" />
      <input id="goalDays" name="target_days" type="text" inputmode="numeric" placeholder="Days" />
      <button class="add-btn" type="submit">Add</button>
    </form>

    <section id="goalList">
{{GOAL_CARDS}}    </section>

    <p class="hint"><span id="goalCount">{{COUNT}}</span> habit(s) tracked. Press Enter in either field to add.</p>
  </main>

  <script>
    document.body.classList.add('js');

    const listEl = document.getElementById('goalList');
    const countEl = document.getElementById('goalCount');
    const addForm = document.getElementById('addForm');
    const nameEl = document.getElementById('goalName');
    const daysEl = document.getElementById('goalDays');
    const runningFlows = new Set();

    const escapeHtml = (str) => String(str)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;');

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body || {})
      });
      if (!res.ok) {
        const err = new Error((await res.text()) || 'Request failed');
        err.status = res.status;
        throw err;
      }
      return res.json();
    };

    // A 409 means the flow was already answered elsewhere.
    const showError = (err) => {
      if (err.status !== 409) {
        alert(err.message);
      }
    };

    const flowHtml = (g) => {
      const f = g.flow;
      if (!f) {
        return '';
      }
      if (f.default_amount != null) {
        return `
          <form class="flow" method="post" action="/goals/${g.index}/extend" data-action="extend" data-id="${g.id}">
            <p class="flow-prompt">${escapeHtml(f.prompt)}</p>
            <input type="text" name="days" value="${escapeHtml(f.default_amount)}" />
            <button class="add-btn" type="submit">Add days</button>
          </form>`;
      }
      return `
          <form class="flow" method="post" action="/goals/${g.index}/decision" data-action="decision" data-id="${g.id}">
            <p class="flow-prompt">${escapeHtml(f.prompt)}</p>
            <button class="add-btn" type="submit" name="keep_going" value="true">Keep going</button>
            <button class="remove-btn" type="submit" name="keep_going" value="false">Stop here</button>
          </form>`;
    };

    const cardHtml = (g) => `
        <div class="goal-card" data-index="${g.index}">
          <div class="circular" style="--angle: ${g.angle}deg;"><span class="perc-text">${g.percentage}%</span></div>
          <div class="goal-info"><b>${escapeHtml(g.name)}</b><br>${g.completed_days}/${g.target_days} days<br><small>${g.streak}</small></div>
          <div class="goal-actions">
            <form method="post" action="/goals/${g.index}/complete" data-action="complete" data-id="${g.id}">
              <button class="done-btn" type="submit">✔</button>
            </form>
            <form method="post" action="/goals/${g.index}/remove" data-action="remove" data-id="${g.id}" data-name="${escapeHtml(g.name)}">
              <label class="confirm-box"><input type="checkbox" name="confirmed" value="true" /> sure</label>
              <button class="remove-btn" type="submit">✖</button>
            </form>
          </div>${flowHtml(g)}
        </div>`;

    const renderBoard = (board) => {
      listEl.innerHTML = board.goals.map(cardHtml).join('');
      countEl.textContent = board.goals.length;
    };

    const finish = (res) => {
      renderBoard(res.board);
      if (res.message) {
        alert(res.message);
      }
    };

    // Walks an open flow through its dialogs. One walk per goal at a time.
    const runFlow = async (flow) => {
      if (runningFlows.has(flow.goal_id)) {
        return;
      }
      runningFlows.add(flow.goal_id);
      try {
        let step = flow;
        let res = null;
        if (step.state === 'awaiting_extend_decision') {
          const keep = confirm(step.prompt);
          res = await post(`/api/goals/${flow.goal_id}/decision`, { keep_going: keep });
          step = res.flow;
        }
        if (step && step.state === 'awaiting_extend_amount') {
          const extra = prompt(step.prompt, step.default_amount || '');
          res = await post(`/api/goals/${flow.goal_id}/extend`, { days: extra });
        }
        if (res) {
          finish(res);
        }
      } catch (err) {
        showError(err);
      } finally {
        runningFlows.delete(flow.goal_id);
      }
    };

    const doneToday = async (id) => {
      const res = await post(`/api/goals/${id}/complete`);
      renderBoard(res.board);
      if (res.motivation) {
        setTimeout(() => alert(res.motivation.text), res.motivation.delay_ms);
      }
      if (res.flow) {
        setTimeout(() => runFlow(res.flow), res.flow.delay_ms);
      }
    };

    const removeGoal = async (id, name) => {
      if (!confirm(`Remove goal "${name}"?`)) {
        return;
      }
      const res = await post(`/api/goals/${id}/remove`, { confirmed: true });
      renderBoard(res.board);
    };

    const decide = async (id, keep) => {
      const res = await post(`/api/goals/${id}/decision`, { keep_going: keep });
      if (res.flow) {
        renderBoard(res.board);
        await runFlow(res.flow);
      } else {
        finish(res);
      }
    };

    const extend = async (id, days) => {
      finish(await post(`/api/goals/${id}/extend`, { days }));
    };

    const addGoal = async () => {
      const res = await post('/api/goals', { name: nameEl.value, target_days: daysEl.value });
      if (res.clear_inputs) {
        nameEl.value = '';
        daysEl.value = '';
      }
      renderBoard(res.board);
    };

    addForm.addEventListener('submit', (e) => {
      e.preventDefault();
      addGoal().catch(showError);
    });

    listEl.addEventListener('submit', (e) => {
      const form = e.target;
      const id = form.dataset.id;
      e.preventDefault();
      let action;
      switch (form.dataset.action) {
        case 'complete':
          action = doneToday(id);
          break;
        case 'remove':
          action = removeGoal(id, form.dataset.name);
          break;
        case 'decision':
          action = decide(id, !!e.submitter && e.submitter.value === 'true');
          break;
        case 'extend':
          action = extend(id, form.elements.days.value);
          break;
        default:
          return;
      }
      action.catch(showError);
    });

    fetch('/api/goals')
      .then((res) => res.json())
      .then((board) => board.goals.filter((g) => g.flow).forEach((g) => runFlow(g.flow)))
      .catch(() => {});
  </script>
</body>
</html>
"#;
