// ==========================================
// 配方原料库存系统 - CSV 流式读取
// ==========================================
// 方言: 逗号分隔、标准引号、首行为表头
// 说明: 逐行读取，不把整个文件读入内存
// 空行: csv 读取器会跳过物理空行，这里先把空行改写为空记录，
//       使每个物理行（引号内换行除外）都占一个行号
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::{ByteRecord, Reader, ReaderBuilder};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub struct CsvRowReader<R: Read> {
    reader: Reader<BlankLineMarker<R>>,
    record: ByteRecord,
    row_number: usize,
}

// 字段扫描状态（与 csv 默认方言一致：只有字段开头的引号开启引用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    LineStart,
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// 在每个空行前插入一个逗号，csv 读取器因此产出一条全空记录而不是跳过它
struct BlankLineMarker<R: Read> {
    inner: BufReader<R>,
    state: ScanState,
    pending: Option<u8>,
}

impl<R: Read> BlankLineMarker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            state: ScanState::LineStart,
            pending: None,
        }
    }

    fn next_state(&self, byte: u8) -> ScanState {
        let terminator = byte == b'\n' || byte == b'\r';
        match self.state {
            ScanState::Quoted => {
                if byte == b'"' {
                    ScanState::QuoteInQuoted
                } else {
                    ScanState::Quoted
                }
            }
            ScanState::LineStart | ScanState::FieldStart if byte == b'"' => ScanState::Quoted,
            ScanState::QuoteInQuoted if byte == b'"' => ScanState::Quoted,
            // \r\n 的 \n 不开启新行
            _ if byte == b'\n' => ScanState::LineStart,
            _ if terminator => ScanState::FieldStart,
            _ if byte == b',' => ScanState::FieldStart,
            _ => ScanState::Unquoted,
        }
    }
}

impl<R: Read> Read for BlankLineMarker<R> {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        let mut n = 0;
        while n < out.len() {
            if let Some(byte) = self.pending.take() {
                out[n] = byte;
                n += 1;
                continue;
            }

            let byte = match self.inner.fill_buf()?.first() {
                Some(&b) => b,
                None => break,
            };
            self.inner.consume(1);

            if self.state == ScanState::LineStart && (byte == b'\n' || byte == b'\r') {
                out[n] = b',';
                self.pending = Some(byte);
            } else {
                out[n] = byte;
            }
            n += 1;
            self.state = self.next_state(byte);
        }
        Ok(n)
    }
}

impl CsvRowReader<File> {
    /// 打开 CSV 文件
    pub fn open(path: &Path) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CsvRowReader<R> {
    pub fn from_reader(rdr: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(BlankLineMarker::new(rdr));

        Self {
            reader,
            record: ByteRecord::new(),
            row_number: 0,
        }
    }

    /// 读取表头行
    ///
    /// # 错误
    /// - InvalidFormat: 文件为空或首行无法解析
    pub fn read_headers(&mut self) -> ImportResult<Vec<String>> {
        match self.read_cells() {
            Ok(Some(cells)) => Ok(cells),
            Ok(None) => Err(ImportError::InvalidFormat),
            Err(e) => {
                tracing::warn!(error = %e, "表头读取失败");
                Err(ImportError::InvalidFormat)
            }
        }
    }

    /// 读取下一条数据记录
    ///
    /// # 返回
    /// - Ok(Some(cells)): 单元格（非 UTF-8 字节按替换字符解码）
    /// - Ok(None): 文件结束
    pub fn next_row(&mut self) -> ImportResult<Option<Vec<String>>> {
        self.read_cells()
    }

    /// 最近一次读取的记录行号（表头为第 1 行，空行同样计数）
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    fn read_cells(&mut self) -> ImportResult<Option<Vec<String>>> {
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(None);
        }
        self.row_number += 1;

        let cells = self
            .record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        Ok(Some(cells))
    }
}
