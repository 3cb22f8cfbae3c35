pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>Analisador Contábil e Financeiro</title>
<style>
  body { font-family: sans-serif; margin: 0; display: flex; min-height: 100vh; }
  aside { width: 280px; padding: 1.5rem; background: #f0f2f6; }
  main { flex: 1; padding: 1.5rem 2rem; }
  textarea { width: 100%; height: 300px; font-family: monospace; }
  .info { background: #e8f0fe; padding: .5rem 1rem; border-radius: 4px; }
  .error { background: #fdecea; color: #611a15; padding: .5rem 1rem; border-radius: 4px; }
  [hidden] { display: none; }
</style>
</head>
<body>
<aside>
  <h2>Upload de Arquivo</h2>
  <form id="upload">
    <p><input type="file" name="file" accept=".pdf,.xlsx,application/pdf,application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" required></p>
    <p>
      <label for="format">Formato do relatório</label><br>
      <select id="format" name="format">
        <option value="xlsx">Excel (.xlsx)</option>
        <option value="docx">Word (.docx)</option>
      </select>
    </p>
    <p><button type="submit">Analisar</button></p>
  </form>
  <p class="info" id="hint">Por favor, envie um arquivo PDF ou Excel para começar.</p>
</aside>
<main>
  <h1>Analisador Contábil e Financeiro</h1>
  <p class="info" id="progress" hidden></p>
  <p class="error" id="error" hidden></p>
  <section id="extracted" hidden>
    <h3>Conteúdo extraído</h3>
    <textarea readonly></textarea>
  </section>
  <section id="report" hidden>
    <h3>Relatório da Análise</h3>
    <textarea readonly></textarea>
    <p><a id="download" href="/report">Baixar Relatório</a></p>
  </section>
</main>
<script>
  const form = document.getElementById('upload');
  const progress = document.getElementById('progress');
  const error = document.getElementById('error');
  const extracted = document.getElementById('extracted');
  const report = document.getElementById('report');

  form.addEventListener('submit', async (event) => {
    event.preventDefault();
    error.hidden = true;
    extracted.hidden = true;
    report.hidden = true;
    document.getElementById('hint').hidden = true;
    progress.textContent = 'Processando arquivo e analisando os dados...';
    progress.hidden = false;

    try {
      const response = await fetch('/analyze', { method: 'POST', body: new FormData(form) });
      const body = await response.json();
      progress.hidden = true;
      if (!response.ok) {
        error.textContent = body.message;
        error.hidden = false;
        return;
      }
      extracted.querySelector('textarea').value = body.extracted_text;
      extracted.hidden = false;
      report.querySelector('textarea').value = body.report;
      const link = document.getElementById('download');
      link.href = body.download.url;
      link.download = body.download.file_name;
      report.hidden = false;
    } catch (e) {
      progress.hidden = true;
      error.textContent = 'Falha de comunicação com o servidor: ' + e;
      error.hidden = false;
    }
  });
</script>
</body>
</html>
"#;
