//! Registration page served at `/`.
//!
//! The page script checks the two required fields, posts the form as
//! multipart data to `/api/submit` and shows the server's `msg` inline.

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{title}}</title>
    <style>
        body { background: #121212; color: white; font-family: sans-serif; display: flex; flex-direction: column; align-items: center; padding: 20px; }
        h1 { color: #f1c40f; text-transform: uppercase; }
        .card { background: #1e1e1e; padding: 20px; border-radius: 10px; width: 100%; max-width: 400px; box-shadow: 0 4px 6px rgba(0,0,0,0.3); }
        input { width: 100%; padding: 12px; margin: 10px 0; background: #333; border: 1px solid #444; color: white; border-radius: 5px; box-sizing: border-box; }
        button { width: 100%; padding: 15px; background: #f1c40f; color: black; font-weight: bold; border: none; border-radius: 5px; cursor: pointer; margin-top: 10px; }
        .msg { color: #2ecc71; text-align: center; margin-top: 10px; display: none; }
        .error { color: #e74c3c; text-align: center; margin-top: 10px; display: none; }
        label { font-size: 0.9rem; color: #aaa; }
        a { color: #f1c40f; text-decoration: none; }
    </style>
</head>
<body>
    <h1>{{title}}</h1>
    <form class="card" id="form" onsubmit="register(event)">
        <label for="name">Nombre del Jugador</label>
        <input type="text" id="name" name="name" placeholder="Ej: Juan Pérez">

        <label for="club">Club (Opcional)</label>
        <input type="text" id="club" name="club" placeholder="Ej: Leones TC">

        <label for="category">Categoría</label>
        <input type="text" id="category" name="category" placeholder="Ej: Open">

        <label for="photo">Foto de Perfil (Opcional)</label>
        <input type="file" id="photo" name="file" accept="image/*">

        <button type="submit" id="btn">CONFIRMAR INSCRIPCIÓN</button>
        <div class="msg" id="msg">¡Inscripción exitosa!</div>
        <div class="error" id="err"></div>
    </form>

    <div style="margin-top: 30px;">
        <a href="/ranking">Ver Ranking &rarr;</a>
    </div>

    <script>
        async function register(ev) {
            ev.preventDefault();
            const btn = document.getElementById('btn');
            const msg = document.getElementById('msg');
            const err = document.getElementById('err');

            const name = document.getElementById('name').value;
            const club = document.getElementById('club').value;
            const cat = document.getElementById('category').value;
            const photo = document.getElementById('photo').files[0];

            if (!name || !cat) {
                err.innerText = "Nombre y Categoría obligatorios";
                err.style.display = "block";
                return;
            }

            btn.disabled = true;
            btn.innerText = "Enviando...";
            err.style.display = "none";

            const data = new FormData();
            data.append('name', name);
            data.append('club', club);
            data.append('category', cat);
            if (photo) {
                data.append('file', photo);
            }

            try {
                const r = await fetch('/api/submit', { method: 'POST', body: data });
                const body = await r.json();
                if (body.status !== 'ok') {
                    throw new Error(body.msg);
                }
                msg.style.display = "block";
                btn.innerText = "¡Listo!";
                setTimeout(() => location.reload(), 2000);
            } catch (e) {
                err.innerText = "Error: " + e.message;
                err.style.display = "block";
                btn.disabled = false;
                btn.innerText = "CONFIRMAR INSCRIPCIÓN";
            }
        }
    </script>
</body>
</html>
"#;

/// Render the page with `title` as document title and heading.
pub fn render(title: &str) -> String {
    TEMPLATE.replace("{{title}}", &escape_html(title))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
